//! Ordinary least squares regressors.
//!
//! `LinearRegressor` is a single-output OLS fit solved through the normal
//! equations with Cholesky decomposition. `MultiLinearRegressor` is its
//! natively multi-output counterpart, fitting one coefficient vector per
//! output column in a single pass.

use crate::error::{Result, ShapcastError};
use crate::models::estimator::{
    Estimator, EstimatorFamily, JointEstimator, LinearCoefficients,
};
use crate::utils::linalg::solve_symmetric;

/// Single-output OLS regressor.
#[derive(Debug, Clone, Default)]
pub struct LinearRegressor {
    weights: Option<Vec<f64>>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the normal equations (with intercept) and solve for
/// `[intercept, w_1, ..., w_p]`.
fn fit_ols(x: &[Vec<f64>], y: &[f64]) -> Result<(f64, Vec<f64>)> {
    if x.is_empty() {
        return Err(ShapcastError::EmptyData);
    }
    if x.len() != y.len() {
        return Err(ShapcastError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    let p = x[0].len();
    let np = p + 1;
    let mut xtx = vec![vec![0.0; np]; np];
    let mut xty = vec![0.0; np];

    for (row, &yi) in x.iter().zip(y.iter()) {
        if row.len() != p {
            return Err(ShapcastError::DimensionMismatch {
                expected: p,
                got: row.len(),
            });
        }
        xtx[0][0] += 1.0;
        xty[0] += yi;
        for i in 0..p {
            xtx[0][i + 1] += row[i];
            xtx[i + 1][0] += row[i];
            xty[i + 1] += row[i] * yi;
            for j in 0..=i {
                xtx[i + 1][j + 1] += row[i] * row[j];
            }
        }
    }
    for i in 0..np {
        for j in (i + 1)..np {
            xtx[i][j] = xtx[j][i];
        }
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ShapcastError::ComputationError(
            "OLS fit failed: normal equations not positive definite".to_string(),
        )
    })?;
    Ok((beta[0], beta[1..].to_vec()))
}

fn predict_linear(weights: &[f64], intercept: f64, x: &[Vec<f64>]) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(x.len());
    for row in x {
        if row.len() != weights.len() {
            return Err(ShapcastError::DimensionMismatch {
                expected: weights.len(),
                got: row.len(),
            });
        }
        let dot: f64 = weights.iter().zip(row.iter()).map(|(w, v)| w * v).sum();
        out.push(intercept + dot);
    }
    Ok(out)
}

impl Estimator for LinearRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let (intercept, weights) = fit_ols(x, y)?;
        self.intercept = intercept;
        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let weights = self.weights.as_ref().ok_or(ShapcastError::FitRequired)?;
        predict_linear(weights, self.intercept, x)
    }

    fn name(&self) -> &str {
        "LinearRegressor"
    }

    fn family(&self) -> EstimatorFamily {
        EstimatorFamily::Linear
    }

    fn coefficients(&self) -> Option<LinearCoefficients> {
        self.weights.as_ref().map(|w| LinearCoefficients {
            weights: w.clone(),
            intercept: self.intercept,
        })
    }
}

/// Natively multi-output OLS regressor: one coefficient vector per output.
#[derive(Debug, Clone, Default)]
pub struct MultiLinearRegressor {
    outputs: Vec<(f64, Vec<f64>)>,
}

impl MultiLinearRegressor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JointEstimator for MultiLinearRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[Vec<f64>]) -> Result<()> {
        if y.is_empty() || y[0].is_empty() {
            return Err(ShapcastError::EmptyData);
        }
        let n_outputs = y[0].len();
        let mut outputs = Vec::with_capacity(n_outputs);
        for k in 0..n_outputs {
            let column: Vec<f64> = y
                .iter()
                .map(|row| {
                    row.get(k).copied().ok_or(ShapcastError::DimensionMismatch {
                        expected: n_outputs,
                        got: row.len(),
                    })
                })
                .collect::<Result<_>>()?;
            outputs.push(fit_ols(x, &column)?);
        }
        self.outputs = outputs;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if self.outputs.is_empty() {
            return Err(ShapcastError::FitRequired);
        }
        let per_output: Vec<Vec<f64>> = self
            .outputs
            .iter()
            .map(|(intercept, weights)| predict_linear(weights, *intercept, x))
            .collect::<Result<_>>()?;
        // Transpose to rows x outputs.
        Ok((0..x.len())
            .map(|r| per_output.iter().map(|col| col[r]).collect())
            .collect())
    }

    fn n_outputs(&self) -> usize {
        self.outputs.len()
    }

    fn name(&self) -> &str {
        "MultiLinearRegressor"
    }

    fn family(&self) -> EstimatorFamily {
        EstimatorFamily::Linear
    }

    fn coefficients(&self, output: usize) -> Option<LinearCoefficients> {
        self.outputs.get(output).map(|(intercept, weights)| {
            LinearCoefficients {
                weights: weights.clone(),
                intercept: *intercept,
            }
        })
    }
}
