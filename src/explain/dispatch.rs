//! Multi-output dispatch across estimator layouts.
//!
//! A per-slot model gets one explainer handle per (horizon, target)
//! estimator, each bound to its own estimator slice at construction; a
//! joint model gets a single handle whose raw output is computed once per
//! foreground and sliced per requested pair. Either way the caller sees
//! the same per-pair [`Explanation`] shape.

use crate::error::{Result, ShapcastError};
use crate::explain::engine::{EngineOptions, ExplainerHandle, TargetModel};
use crate::explain::matrix::FeatureMatrix;
use crate::explain::method::{select, ShapMethod};
use crate::models::{Estimator, EstimatorLayout, JointEstimator, RegressionModel};
use chrono::{DateTime, Utc};

/// SHAP values for one (horizon, target) pair over a foreground matrix.
#[derive(Debug, Clone)]
pub(crate) struct Explanation {
    /// `values[row][feature]`.
    pub values: Vec<Vec<f64>>,
    /// One base value per row.
    pub base_values: Vec<f64>,
    /// Feature column names, aligned with `values` rows.
    pub feature_names: Vec<String>,
    /// Timestamp of each explained row.
    pub time_index: Vec<DateTime<Utc>>,
}

enum ExplainerGrid<'m> {
    /// `handles[horizon][target]`, each entry carrying its estimator slice.
    PerSlot(Vec<Vec<(ExplainerHandle, &'m dyn Estimator)>>),
    Joint(ExplainerHandle, &'m dyn JointEstimator),
}

/// Explainer handles for every output of a regression model, plus the
/// shared background dataset.
pub(crate) struct RegressionExplainers<'m> {
    pub background: FeatureMatrix,
    grid: ExplainerGrid<'m>,
    n: usize,
    target_dim: usize,
    /// With a single horizon and a single target component the underlying
    /// estimator is scalar and raw outputs are never sliced.
    single_output: bool,
}

impl<'m> RegressionExplainers<'m> {
    /// Build one handle per estimator, resolving the method once from the
    /// estimator family (an explicit method overrides the policy).
    pub(crate) fn new(
        model: &'m RegressionModel,
        background: FeatureMatrix,
        explicit_method: Option<ShapMethod>,
        options: &EngineOptions,
    ) -> Result<Self> {
        let n = model.output_chunk_length();
        let target_dim = model.target_dim();
        let method = select(model.estimator_family()?, explicit_method);

        let grid = match model.layout() {
            EstimatorLayout::Joint(estimator) => ExplainerGrid::Joint(
                ExplainerHandle::build(method, estimator.name(), options)?,
                estimator.as_ref(),
            ),
            EstimatorLayout::PerSlot { .. } => {
                let mut rows = Vec::with_capacity(n);
                for h in 0..n {
                    let mut row = Vec::with_capacity(target_dim);
                    for t in 0..target_dim {
                        let estimator = model.estimator(h, t)?;
                        let handle =
                            ExplainerHandle::build(method, estimator.name(), options)?;
                        row.push((handle, estimator));
                    }
                    rows.push(row);
                }
                ExplainerGrid::PerSlot(rows)
            }
        };

        Ok(Self {
            background,
            grid,
            n,
            target_dim,
            single_output: n == 1 && target_dim == 1,
        })
    }

    #[cfg(test)]
    pub(crate) fn n_horizons(&self) -> usize {
        self.n
    }

    #[cfg(test)]
    pub(crate) fn target_dim(&self) -> usize {
        self.target_dim
    }

    /// Explain a foreground matrix for each requested (horizon, target)
    /// pair. Entries are ordered horizon-major, matching the request order.
    pub(crate) fn shap_explanations(
        &self,
        foreground: &FeatureMatrix,
        horizons: &[usize],
        targets: &[usize],
    ) -> Result<Vec<(usize, usize, Explanation)>> {
        for &h in horizons {
            if h >= self.n {
                return Err(ShapcastError::IndexOutOfBounds {
                    index: h,
                    size: self.n,
                });
            }
        }
        for &t in targets {
            if t >= self.target_dim {
                return Err(ShapcastError::IndexOutOfBounds {
                    index: t,
                    size: self.target_dim,
                });
            }
        }

        let mut entries = Vec::with_capacity(horizons.len() * targets.len());
        match &self.grid {
            ExplainerGrid::Joint(handle, estimator) => {
                // One raw pass covers every output; requested pairs slice it.
                let raw = handle.explain(
                    &TargetModel::Joint(*estimator),
                    &self.background,
                    foreground,
                )?;
                for &h in horizons {
                    for &t in targets {
                        let idx = if self.single_output {
                            0
                        } else {
                            self.target_dim * h + t
                        };
                        let values: Vec<Vec<f64>> =
                            raw.values.iter().map(|row| row[idx].clone()).collect();
                        let base_values: Vec<f64> =
                            raw.base_values.iter().map(|row| row[idx]).collect();
                        entries.push((h, t, self.wrap(values, base_values, foreground)));
                    }
                }
            }
            ExplainerGrid::PerSlot(handles) => {
                for &h in horizons {
                    for &t in targets {
                        let (handle, estimator) = &handles[h][t];
                        let raw = handle.explain(
                            &TargetModel::Single(*estimator),
                            &self.background,
                            foreground,
                        )?;
                        let values: Vec<Vec<f64>> = raw
                            .values
                            .into_iter()
                            .map(|mut row| row.swap_remove(0))
                            .collect();
                        let base_values: Vec<f64> =
                            raw.base_values.into_iter().map(|row| row[0]).collect();
                        entries.push((h, t, self.wrap(values, base_values, foreground)));
                    }
                }
            }
        }

        Ok(entries)
    }

    fn wrap(
        &self,
        values: Vec<Vec<f64>>,
        base_values: Vec<f64>,
        foreground: &FeatureMatrix,
    ) -> Explanation {
        Explanation {
            values,
            base_values,
            feature_names: foreground.columns.clone(),
            time_index: foreground.time_index.clone(),
        }
    }
}
