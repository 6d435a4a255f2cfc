//! k-nearest-neighbors regression.

use crate::error::{Result, ShapcastError};
use crate::models::estimator::{Estimator, EstimatorFamily};

/// Regressor predicting the mean label of the k nearest training rows
/// (Euclidean distance).
#[derive(Debug, Clone)]
pub struct KNeighborsRegressor {
    k: usize,
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
}

impl KNeighborsRegressor {
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            x: Vec::new(),
            y: Vec::new(),
        }
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(p, q)| (p - q) * (p - q)).sum()
}

impl Estimator for KNeighborsRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.is_empty() {
            return Err(ShapcastError::EmptyData);
        }
        if x.len() != y.len() {
            return Err(ShapcastError::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        self.x = x.to_vec();
        self.y = y.to_vec();
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.x.is_empty() {
            return Err(ShapcastError::FitRequired);
        }
        let k = self.k.min(self.x.len());
        let mut out = Vec::with_capacity(x.len());
        for row in x {
            if row.len() != self.x[0].len() {
                return Err(ShapcastError::DimensionMismatch {
                    expected: self.x[0].len(),
                    got: row.len(),
                });
            }
            let mut distances: Vec<(f64, f64)> = self
                .x
                .iter()
                .zip(self.y.iter())
                .map(|(train, &label)| (squared_distance(row, train), label))
                .collect();
            distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            let mean = distances[..k].iter().map(|(_, label)| label).sum::<f64>() / k as f64;
            out.push(mean);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "KNeighborsRegressor"
    }

    fn family(&self) -> EstimatorFamily {
        EstimatorFamily::Neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_neighbor_memorizes_training_points() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![10.0, 20.0, 30.0];
        let mut model = KNeighborsRegressor::new(1);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&[vec![0.1], vec![1.9]]).unwrap();
        assert_relative_eq!(preds[0], 10.0);
        assert_relative_eq!(preds[1], 30.0);
    }

    #[test]
    fn averages_over_k_neighbors() {
        let x = vec![vec![0.0], vec![1.0], vec![10.0]];
        let y = vec![1.0, 3.0, 100.0];
        let mut model = KNeighborsRegressor::new(2);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&[vec![0.5]]).unwrap();
        assert_relative_eq!(preds[0], 2.0);
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = KNeighborsRegressor::new(3);
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(ShapcastError::FitRequired)
        ));
    }
}
