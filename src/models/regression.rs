//! Lag-based regression forecasting model.
//!
//! Wraps tabular estimators behind a forecasting interface: features are
//! lagged values of the target (and optional covariates), labels are the
//! next `output_chunk_length` target steps. Whether the model holds one
//! joint multi-output estimator or an independent estimator per
//! (horizon, target component) pair is decided once at construction and
//! never re-checked.

use crate::core::TimeSeries;
use crate::error::{Result, ShapcastError};
use crate::lagged::{create_lagged_data, LagSpec};
use crate::models::estimator::{Estimator, EstimatorFamily, JointEstimator};

/// Factory for per-slot estimators, in the spirit of a model registry:
/// every (horizon, target) slot gets an independent instance.
pub type EstimatorFactory = Box<dyn Fn() -> Box<dyn Estimator> + Send + Sync>;

/// How the model maps estimators onto its outputs.
pub enum EstimatorLayout {
    /// One estimator natively emitting all (horizon, target) outputs.
    Joint(Box<dyn JointEstimator>),
    /// One independent estimator per (horizon, target) pair, built from a
    /// shared factory; `estimators[horizon][target]` after fitting.
    PerSlot {
        factory: EstimatorFactory,
        estimators: Vec<Vec<Box<dyn Estimator>>>,
    },
}

impl std::fmt::Debug for EstimatorLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatorLayout::Joint(est) => write!(f, "Joint({})", est.name()),
            EstimatorLayout::PerSlot { estimators, .. } => {
                write!(f, "PerSlot({} slots)", estimators.iter().map(Vec::len).sum::<usize>())
            }
        }
    }
}

/// A regression forecasting model over lagged features.
pub struct RegressionModel {
    lags: LagSpec,
    output_chunk_length: usize,
    layout: EstimatorLayout,
    target_components: Vec<String>,
    past_components: Vec<String>,
    future_components: Vec<String>,
    training_target: Option<TimeSeries>,
    training_past: Option<TimeSeries>,
    training_future: Option<TimeSeries>,
}

impl RegressionModel {
    /// Model backed by a single joint multi-output estimator.
    pub fn with_joint(
        lags: LagSpec,
        output_chunk_length: usize,
        estimator: Box<dyn JointEstimator>,
    ) -> Result<Self> {
        Self::new(lags, output_chunk_length, EstimatorLayout::Joint(estimator))
    }

    /// Model backed by one estimator per (horizon, target) pair.
    pub fn per_slot<F>(lags: LagSpec, output_chunk_length: usize, factory: F) -> Result<Self>
    where
        F: Fn() -> Box<dyn Estimator> + Send + Sync + 'static,
    {
        Self::new(
            lags,
            output_chunk_length,
            EstimatorLayout::PerSlot {
                factory: Box::new(factory),
                estimators: Vec::new(),
            },
        )
    }

    fn new(lags: LagSpec, output_chunk_length: usize, layout: EstimatorLayout) -> Result<Self> {
        lags.validate()?;
        if output_chunk_length == 0 {
            return Err(ShapcastError::InvalidConfiguration(
                "output_chunk_length must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            lags,
            output_chunk_length,
            layout,
            target_components: Vec::new(),
            past_components: Vec::new(),
            future_components: Vec::new(),
            training_target: None,
            training_past: None,
            training_future: None,
        })
    }

    /// Fit on a target series and optional covariates.
    pub fn fit(
        &mut self,
        target: &TimeSeries,
        past_covariates: Option<&TimeSeries>,
        future_covariates: Option<&TimeSeries>,
    ) -> Result<()> {
        let data = create_lagged_data(
            target,
            self.output_chunk_length,
            past_covariates,
            future_covariates,
            &self.lags,
            true,
        )?;

        let target_dim = target.dimensions();
        match &mut self.layout {
            EstimatorLayout::Joint(estimator) => {
                estimator.fit(&data.matrix, &data.labels)?;
            }
            EstimatorLayout::PerSlot {
                factory,
                estimators,
            } => {
                let mut grid = Vec::with_capacity(self.output_chunk_length);
                for h in 0..self.output_chunk_length {
                    let mut row = Vec::with_capacity(target_dim);
                    for t in 0..target_dim {
                        let column: Vec<f64> = data
                            .labels
                            .iter()
                            .map(|label| label[h * target_dim + t])
                            .collect();
                        let mut estimator = factory();
                        estimator.fit(&data.matrix, &column)?;
                        row.push(estimator);
                    }
                    grid.push(row);
                }
                *estimators = grid;
            }
        }

        self.target_components = target.components().to_vec();
        self.past_components = past_covariates.map_or(Vec::new(), |c| c.components().to_vec());
        self.future_components =
            future_covariates.map_or(Vec::new(), |c| c.components().to_vec());
        self.training_target = Some(target.clone());
        self.training_past = past_covariates.cloned();
        self.training_future = future_covariates.cloned();
        Ok(())
    }

    /// Forecast `n` steps past the end of the training series
    /// (`n <= output_chunk_length`).
    pub fn predict(&self, n: usize) -> Result<TimeSeries> {
        let target = self.training_target.as_ref().ok_or(ShapcastError::FitRequired)?;
        if n == 0 || n > self.output_chunk_length {
            return Err(ShapcastError::InvalidArgument(format!(
                "n must be in [1, {}], got {n}",
                self.output_chunk_length
            )));
        }

        let anchor = target.len();
        let row = self.feature_row(anchor)?;
        let target_dim = self.target_components.len();

        // outputs[h * target_dim + t]
        let outputs: Vec<f64> = match &self.layout {
            EstimatorLayout::Joint(estimator) => estimator
                .predict(std::slice::from_ref(&row))?
                .into_iter()
                .next()
                .ok_or(ShapcastError::EmptyData)?,
            EstimatorLayout::PerSlot { estimators, .. } => {
                let mut out = Vec::with_capacity(self.output_chunk_length * target_dim);
                for horizon_row in estimators {
                    for estimator in horizon_row {
                        out.push(estimator.predict(std::slice::from_ref(&row))?[0]);
                    }
                }
                out
            }
        };

        let step = target.regular_step()?;
        let last = *target.timestamps().last().ok_or(ShapcastError::EmptyData)?;
        let timestamps: Vec<_> = (1..=n as i64).map(|i| last + step * i as i32).collect();
        let values: Vec<Vec<f64>> = (0..target_dim)
            .map(|t| (0..n).map(|h| outputs[h * target_dim + t]).collect())
            .collect();
        TimeSeries::new(timestamps, values, self.target_components.clone())
    }

    /// Build the feature row anchored at index `anchor` of the training data.
    fn feature_row(&self, anchor: usize) -> Result<Vec<f64>> {
        let target = self.training_target.as_ref().ok_or(ShapcastError::FitRequired)?;
        let mut row = Vec::new();
        for &lag in &self.lags.target {
            for dim in 0..target.dimensions() {
                row.push(target.values(dim)?[anchor - lag]);
            }
        }
        if !self.lags.past.is_empty() {
            let past = self.training_past.as_ref().ok_or(ShapcastError::FitRequired)?;
            for &lag in &self.lags.past {
                for dim in 0..past.dimensions() {
                    row.push(past.values(dim)?[anchor - lag]);
                }
            }
        }
        if !self.lags.future.is_empty() {
            let future = self.training_future.as_ref().ok_or(ShapcastError::FitRequired)?;
            for &lag in &self.lags.future {
                if lag > anchor || anchor - lag >= future.len() {
                    return Err(ShapcastError::InvalidArgument(
                        "future covariates do not cover the forecast anchor".to_string(),
                    ));
                }
                for dim in 0..future.dimensions() {
                    row.push(future.values(dim)?[anchor - lag]);
                }
            }
        }
        Ok(row)
    }

    /// Whether the model has been fitted.
    pub fn is_fitted(&self) -> bool {
        self.training_target.is_some()
    }

    /// The target series the model was fitted on.
    pub fn training_target(&self) -> Option<&TimeSeries> {
        self.training_target.as_ref()
    }

    /// The past covariates the model was fitted with.
    pub fn training_past(&self) -> Option<&TimeSeries> {
        self.training_past.as_ref()
    }

    /// The future covariates the model was fitted with.
    pub fn training_future(&self) -> Option<&TimeSeries> {
        self.training_future.as_ref()
    }

    /// The model's configured forecast length.
    pub fn output_chunk_length(&self) -> usize {
        self.output_chunk_length
    }

    /// The model's lag specification.
    pub fn lags(&self) -> &LagSpec {
        &self.lags
    }

    /// Target component names (available after fitting).
    pub fn target_components(&self) -> &[String] {
        &self.target_components
    }

    /// Past covariate component names (available after fitting).
    pub fn past_components(&self) -> &[String] {
        &self.past_components
    }

    /// Future covariate component names (available after fitting).
    pub fn future_components(&self) -> &[String] {
        &self.future_components
    }

    /// Number of target components.
    pub fn target_dim(&self) -> usize {
        self.target_components.len()
    }

    /// Whether the model holds one estimator per (horizon, target) pair.
    pub fn is_per_slot(&self) -> bool {
        matches!(self.layout, EstimatorLayout::PerSlot { .. })
    }

    /// The estimator layout.
    pub fn layout(&self) -> &EstimatorLayout {
        &self.layout
    }

    /// The estimator slice for one (horizon, target) pair (per-slot only).
    pub fn estimator(&self, horizon: usize, target: usize) -> Result<&dyn Estimator> {
        match &self.layout {
            EstimatorLayout::PerSlot { estimators, .. } => {
                if !self.is_fitted() {
                    return Err(ShapcastError::FitRequired);
                }
                let row = estimators.get(horizon).ok_or(ShapcastError::IndexOutOfBounds {
                    index: horizon,
                    size: estimators.len(),
                })?;
                row.get(target)
                    .map(|b| b.as_ref())
                    .ok_or(ShapcastError::IndexOutOfBounds {
                        index: target,
                        size: row.len(),
                    })
            }
            EstimatorLayout::Joint(_) => Err(ShapcastError::InvalidArgument(
                "joint models have no per-slot estimators".to_string(),
            )),
        }
    }

    /// The joint estimator, if the model is joint.
    pub fn joint_estimator(&self) -> Option<&dyn JointEstimator> {
        match &self.layout {
            EstimatorLayout::Joint(estimator) => Some(estimator.as_ref()),
            EstimatorLayout::PerSlot { .. } => None,
        }
    }

    /// Family tag of the underlying estimator (requires a fitted model for
    /// the per-slot case).
    pub fn estimator_family(&self) -> Result<EstimatorFamily> {
        match &self.layout {
            EstimatorLayout::Joint(estimator) => Ok(estimator.family()),
            EstimatorLayout::PerSlot { estimators, .. } => estimators
                .first()
                .and_then(|row| row.first())
                .map(|e| e.family())
                .ok_or(ShapcastError::FitRequired),
        }
    }

    /// Name of the underlying estimator.
    pub fn estimator_name(&self) -> Result<String> {
        match &self.layout {
            EstimatorLayout::Joint(estimator) => Ok(estimator.name().to_string()),
            EstimatorLayout::PerSlot { estimators, .. } => estimators
                .first()
                .and_then(|row| row.first())
                .map(|e| e.name().to_string())
                .ok_or(ShapcastError::FitRequired),
        }
    }
}

impl std::fmt::Debug for RegressionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegressionModel")
            .field("lags", &self.lags)
            .field("output_chunk_length", &self.output_chunk_length)
            .field("layout", &self.layout)
            .field("fitted", &self.is_fitted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::linear::{LinearRegressor, MultiLinearRegressor};
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| base + Duration::hours(i as i64))
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    fn linear_series(n: usize) -> TimeSeries {
        make_series((0..n).map(|i| 2.0 * i as f64 + 1.0).collect())
    }

    #[test]
    fn per_slot_fit_builds_horizon_by_target_grid() {
        let mut model = RegressionModel::per_slot(
            LagSpec::target_only(vec![1, 2]),
            3,
            || Box::new(LinearRegressor::new()),
        )
        .unwrap();
        model.fit(&linear_series(40), None, None).unwrap();

        assert!(model.is_per_slot());
        assert!(model.estimator(0, 0).is_ok());
        assert!(model.estimator(2, 0).is_ok());
        assert!(matches!(
            model.estimator(3, 0),
            Err(ShapcastError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            model.estimator(0, 1),
            Err(ShapcastError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn joint_and_per_slot_agree_on_a_linear_trend() {
        let series = linear_series(40);

        let mut per_slot = RegressionModel::per_slot(
            LagSpec::target_only(vec![1, 2]),
            2,
            || Box::new(LinearRegressor::new()),
        )
        .unwrap();
        per_slot.fit(&series, None, None).unwrap();

        let mut joint = RegressionModel::with_joint(
            LagSpec::target_only(vec![1, 2]),
            2,
            Box::new(MultiLinearRegressor::new()),
        )
        .unwrap();
        joint.fit(&series, None, None).unwrap();

        let forecast_a = per_slot.predict(2).unwrap();
        let forecast_b = joint.predict(2).unwrap();

        // Trend continues: next values are 81, 83.
        assert_relative_eq!(forecast_a.primary_values()[0], 81.0, epsilon = 1e-3);
        assert_relative_eq!(forecast_a.primary_values()[1], 83.0, epsilon = 1e-3);
        assert_relative_eq!(
            forecast_a.primary_values()[0],
            forecast_b.primary_values()[0],
            epsilon = 1e-6
        );
    }

    #[test]
    fn forecast_timestamps_extend_the_training_index() {
        let series = linear_series(30);
        let mut model = RegressionModel::per_slot(
            LagSpec::target_only(vec![1]),
            2,
            || Box::new(LinearRegressor::new()),
        )
        .unwrap();
        model.fit(&series, None, None).unwrap();

        let forecast = model.predict(2).unwrap();
        let last = *series.timestamps().last().unwrap();
        assert_eq!(forecast.timestamps()[0], last + Duration::hours(1));
        assert_eq!(forecast.timestamps()[1], last + Duration::hours(2));
    }

    #[test]
    fn predict_rejects_unfitted_model_and_bad_horizon() {
        let model = RegressionModel::per_slot(
            LagSpec::target_only(vec![1]),
            2,
            || Box::new(LinearRegressor::new()),
        )
        .unwrap();
        assert!(matches!(model.predict(1), Err(ShapcastError::FitRequired)));

        let mut model = RegressionModel::per_slot(
            LagSpec::target_only(vec![1]),
            2,
            || Box::new(LinearRegressor::new()),
        )
        .unwrap();
        model.fit(&linear_series(20), None, None).unwrap();
        assert!(matches!(
            model.predict(3),
            Err(ShapcastError::InvalidArgument(_))
        ));
        assert!(matches!(
            model.predict(0),
            Err(ShapcastError::InvalidArgument(_))
        ));
    }

    #[test]
    fn captures_component_names_at_fit() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps: Vec<_> = (0..30).map(|i| base + Duration::hours(i)).collect();
        let target = TimeSeries::new(
            timestamps.clone(),
            vec![
                (0..30).map(|i| i as f64).collect(),
                (0..30).map(|i| 2.0 * i as f64).collect(),
            ],
            vec!["load".to_string(), "price".to_string()],
        )
        .unwrap();
        let past = TimeSeries::new(
            timestamps,
            vec![(0..30).map(|i| (i % 4) as f64).collect()],
            vec!["temp".to_string()],
        )
        .unwrap();

        let lags = LagSpec {
            target: vec![1, 2],
            past: vec![1],
            future: vec![],
        };
        let mut model = RegressionModel::per_slot(lags, 2, || Box::new(LinearRegressor::new()))
            .unwrap();
        model.fit(&target, Some(&past), None).unwrap();

        assert_eq!(model.target_components(), &["load", "price"]);
        assert_eq!(model.past_components(), &["temp"]);
        assert_eq!(model.target_dim(), 2);
        assert_eq!(model.estimator_family().unwrap(), EstimatorFamily::Linear);
    }

    #[test]
    fn rejects_zero_output_chunk_length() {
        let result = RegressionModel::per_slot(LagSpec::target_only(vec![1]), 0, || {
            Box::new(LinearRegressor::new())
        });
        assert!(matches!(
            result,
            Err(ShapcastError::InvalidConfiguration(_))
        ));
    }
}
