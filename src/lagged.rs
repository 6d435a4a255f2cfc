//! Lagged feature and label construction for tabular regression on time series.
//!
//! Turns a target series plus optional past/future covariates into a flat
//! feature matrix, one row per explainable timestamp. Feature columns are
//! ordered: all target lags (outer loop over lag value, inner loop over
//! component in series order), then all past-covariate lags, then all
//! future-covariate lags. Downstream column naming relies on exactly this
//! ordering, by positional correspondence.

use crate::core::TimeSeries;
use crate::error::{Result, ShapcastError};
use chrono::{DateTime, Utc};

/// Per-kind ordered lag offsets.
///
/// A lag of `k` reads the value `k` steps into the past. Target and past
/// covariate lags must be at least 1; future covariate lags may be 0,
/// meaning the value at the row's own timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LagSpec {
    /// Lags applied to the target series.
    pub target: Vec<usize>,
    /// Lags applied to past covariates.
    pub past: Vec<usize>,
    /// Lags applied to future covariates.
    pub future: Vec<usize>,
}

impl LagSpec {
    /// Lag spec with target lags only.
    pub fn target_only(lags: Vec<usize>) -> Self {
        Self {
            target: lags,
            ..Default::default()
        }
    }

    /// Validate the spec: target lags are required, zero lags are only
    /// allowed for future covariates.
    pub fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(ShapcastError::InvalidConfiguration(
                "at least one target lag is required".to_string(),
            ));
        }
        if self.target.iter().chain(self.past.iter()).any(|&l| l == 0) {
            return Err(ShapcastError::InvalidConfiguration(
                "target and past covariate lags must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest lookback over all lag kinds.
    pub fn max_lag(&self) -> usize {
        self.target
            .iter()
            .chain(self.past.iter())
            .chain(self.future.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Total number of feature columns given component counts per kind.
    pub fn feature_count(&self, target_dim: usize, past_dim: usize, future_dim: usize) -> usize {
        self.target.len() * target_dim
            + self.past.len() * past_dim
            + self.future.len() * future_dim
    }
}

/// Result of lagged-data construction: a feature matrix with its time index
/// and, in training mode, the label matrix.
#[derive(Debug, Clone)]
pub struct LaggedData {
    /// Feature rows, one per timestamp in `time_index`.
    pub matrix: Vec<Vec<f64>>,
    /// Label rows (training mode only); column order is
    /// `target_dim * horizon + target_index`.
    pub labels: Vec<Vec<f64>>,
    /// Timestamp of each row: the first predicted step for that row.
    pub time_index: Vec<DateTime<Utc>>,
}

/// Build lagged features (and labels, when `training`) from a target series
/// and optional covariates.
///
/// Row `t` holds `series[t - lag]` for every (lag, component) pair. In
/// training mode the label row is `target[t + h]` for each horizon `h` in
/// `0..horizon`, so rows run over `max_lag..=len - horizon`. In explanation
/// mode no labels are produced and rows run over `max_lag..len`, preserving
/// the series' original timestamps.
pub fn create_lagged_data(
    target: &TimeSeries,
    horizon: usize,
    past_covariates: Option<&TimeSeries>,
    future_covariates: Option<&TimeSeries>,
    lags: &LagSpec,
    training: bool,
) -> Result<LaggedData> {
    lags.validate()?;
    if horizon == 0 {
        return Err(ShapcastError::InvalidConfiguration(
            "horizon must be >= 1".to_string(),
        ));
    }
    if !lags.past.is_empty() && past_covariates.is_none() {
        return Err(ShapcastError::InvalidConfiguration(
            "past covariate lags given but no past covariates".to_string(),
        ));
    }
    if !lags.future.is_empty() && future_covariates.is_none() {
        return Err(ShapcastError::InvalidConfiguration(
            "future covariate lags given but no future covariates".to_string(),
        ));
    }
    for cov in [past_covariates, future_covariates].into_iter().flatten() {
        if cov.timestamps() != target.timestamps() {
            return Err(ShapcastError::TimestampError(
                "covariate series must share the target's time index".to_string(),
            ));
        }
    }

    let n = target.len();
    let max_lag = lags.max_lag();
    let end = if training {
        if n < max_lag + horizon {
            return Err(ShapcastError::InsufficientData {
                needed: max_lag + horizon,
                got: n,
            });
        }
        n - horizon + 1
    } else {
        if n <= max_lag {
            return Err(ShapcastError::InsufficientData {
                needed: max_lag + 1,
                got: n,
            });
        }
        n
    };

    let mut matrix = Vec::with_capacity(end - max_lag);
    let mut labels = Vec::new();
    let mut time_index = Vec::with_capacity(end - max_lag);

    for t in max_lag..end {
        let mut row =
            Vec::with_capacity(lags.feature_count(
                target.dimensions(),
                past_covariates.map_or(0, |c| c.dimensions()),
                future_covariates.map_or(0, |c| c.dimensions()),
            ));
        for &lag in &lags.target {
            for dim in 0..target.dimensions() {
                row.push(target.values(dim)?[t - lag]);
            }
        }
        if let Some(past) = past_covariates {
            for &lag in &lags.past {
                for dim in 0..past.dimensions() {
                    row.push(past.values(dim)?[t - lag]);
                }
            }
        }
        if let Some(future) = future_covariates {
            for &lag in &lags.future {
                for dim in 0..future.dimensions() {
                    row.push(future.values(dim)?[t - lag]);
                }
            }
        }
        matrix.push(row);
        time_index.push(target.timestamps()[t]);

        if training {
            let mut label_row = Vec::with_capacity(horizon * target.dimensions());
            for h in 0..horizon {
                for dim in 0..target.dimensions() {
                    label_row.push(target.values(dim)?[t + h]);
                }
            }
            labels.push(label_row);
        }
    }

    Ok(LaggedData {
        matrix,
        labels,
        time_index,
    })
}
