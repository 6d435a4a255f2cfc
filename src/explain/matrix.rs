//! Feature-matrix construction for explanation.
//!
//! Wraps the lagged-data routine and assigns human-readable column names by
//! positional correspondence with its fixed output ordering:
//! `{component}_{target|past_cov|fut_cov}_lag{lag}`.

use crate::core::TimeSeries;
use crate::error::{Result, ShapcastError};
use crate::lagged::create_lagged_data;
use crate::models::RegressionModel;
use crate::utils::sampling::sample_indices;
use chrono::{DateTime, Utc};

/// Minimum number of background rows required to calibrate explanation
/// baselines. Construction fails at or below this row count.
pub const MIN_BACKGROUND_SAMPLE: usize = 10;

/// A tabular feature matrix with named columns and an aligned time index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Feature rows.
    pub rows: Vec<Vec<f64>>,
    /// Column names, positionally aligned with each row.
    pub columns: Vec<String>,
    /// Timestamp of each row.
    pub time_index: Vec<DateTime<Utc>>,
}

impl FeatureMatrix {
    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of feature columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column-wise means over all rows.
    pub fn column_means(&self) -> Vec<f64> {
        let n = self.rows.len();
        let mut means = vec![0.0; self.n_columns()];
        for row in &self.rows {
            for (mean, value) in means.iter_mut().zip(row.iter()) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n as f64;
        }
        means
    }

    /// Uniform random sub-sample of `count` rows, keeping time order.
    pub fn sample(&self, count: usize, seed: Option<u64>) -> FeatureMatrix {
        let indices = sample_indices(self.n_rows(), count, seed);
        FeatureMatrix {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            columns: self.columns.clone(),
            time_index: indices.iter().map(|&i| self.time_index[i]).collect(),
        }
    }
}

/// Build the column name list for a model's lag layout. The order must
/// exactly match `create_lagged_data`: target lags, then past-covariate
/// lags, then future-covariate lags, each grouped by lag then component.
pub(crate) fn lag_feature_names(model: &RegressionModel) -> Vec<String> {
    let lags = model.lags();
    let mut names = Vec::new();
    for lag in &lags.target {
        for component in model.target_components() {
            names.push(format!("{component}_target_lag{lag}"));
        }
    }
    for lag in &lags.past {
        for component in model.past_components() {
            names.push(format!("{component}_past_cov_lag{lag}"));
        }
    }
    for lag in &lags.future {
        for component in model.future_components() {
            names.push(format!("{component}_fut_cov_lag{lag}"));
        }
    }
    names
}

/// Build a feature matrix for explanation from a target series and optional
/// covariates, using the model's lag spec and horizon.
///
/// With `train` set, the matrix is a background dataset and must contain
/// more than [`MIN_BACKGROUND_SAMPLE`] rows. Foreground matrices keep the
/// input series' own time index so explanations map back to calendar time.
/// `n_samples` sub-samples rows uniformly at random on either path.
pub(crate) fn build_feature_matrix(
    model: &RegressionModel,
    target: &TimeSeries,
    past_covariates: Option<&TimeSeries>,
    future_covariates: Option<&TimeSeries>,
    train: bool,
    n_samples: Option<usize>,
    seed: Option<u64>,
) -> Result<FeatureMatrix> {
    let data = create_lagged_data(
        target,
        model.output_chunk_length(),
        past_covariates,
        future_covariates,
        model.lags(),
        false,
    )?;

    if train && data.matrix.len() <= MIN_BACKGROUND_SAMPLE {
        return Err(ShapcastError::InsufficientData {
            needed: MIN_BACKGROUND_SAMPLE + 1,
            got: data.matrix.len(),
        });
    }

    let columns = lag_feature_names(model);
    debug_assert_eq!(
        columns.len(),
        data.matrix.first().map_or(0, Vec::len),
        "column names must align positionally with the lagged matrix"
    );

    let matrix = FeatureMatrix {
        rows: data.matrix,
        columns,
        time_index: data.time_index,
    };

    Ok(match n_samples {
        Some(count) => matrix.sample(count, seed),
        None => matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lagged::LagSpec;
    use crate::models::LinearRegressor;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn make_series(name: &str, values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| base + Duration::hours(i as i64))
            .collect();
        TimeSeries::new(timestamps, vec![values], vec![name.to_string()]).unwrap()
    }

    fn fitted_model(series: &TimeSeries, lags: LagSpec) -> RegressionModel {
        let mut model =
            RegressionModel::per_slot(lags, 1, || Box::new(LinearRegressor::new())).unwrap();
        model.fit(series, None, None).unwrap();
        model
    }

    #[test]
    fn names_single_target_lag_columns() {
        let series = make_series("energy", (0..50).map(|i| i as f64).collect());
        let model = fitted_model(&series, LagSpec::target_only(vec![1, 2, 3]));
        let matrix =
            build_feature_matrix(&model, &series, None, None, true, None, None).unwrap();

        assert_eq!(
            matrix.columns,
            vec![
                "energy_target_lag1".to_string(),
                "energy_target_lag2".to_string(),
                "energy_target_lag3".to_string(),
            ]
        );
        assert_eq!(matrix.n_rows(), 47);
    }

    #[test]
    fn column_names_are_unique_and_kind_ordered() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps: Vec<_> = (0..40).map(|i| base + Duration::hours(i)).collect();
        let target = TimeSeries::new(
            timestamps.clone(),
            vec![
                (0..40).map(|i| i as f64).collect(),
                (0..40).map(|i| 2.0 * i as f64).collect(),
            ],
            vec!["load".to_string(), "price".to_string()],
        )
        .unwrap();
        let past = TimeSeries::new(
            timestamps.clone(),
            vec![(0..40).map(|i| (i % 5) as f64).collect()],
            vec!["temp".to_string()],
        )
        .unwrap();
        let future = TimeSeries::new(
            timestamps,
            vec![(0..40).map(|i| (i % 7) as f64).collect()],
            vec!["holiday".to_string()],
        )
        .unwrap();

        let lags = LagSpec {
            target: vec![1, 2],
            past: vec![1],
            future: vec![0],
        };
        let mut model =
            RegressionModel::per_slot(lags, 1, || Box::new(LinearRegressor::new())).unwrap();
        model.fit(&target, Some(&past), Some(&future)).unwrap();

        let matrix = build_feature_matrix(
            &model,
            &target,
            Some(&past),
            Some(&future),
            true,
            None,
            None,
        )
        .unwrap();

        assert_eq!(
            matrix.columns,
            vec![
                "load_target_lag1",
                "price_target_lag1",
                "load_target_lag2",
                "price_target_lag2",
                "temp_past_cov_lag1",
                "holiday_fut_cov_lag0",
            ]
        );
        let unique: HashSet<_> = matrix.columns.iter().collect();
        assert_eq!(unique.len(), matrix.columns.len());
    }

    #[test]
    fn background_fails_at_threshold_and_succeeds_above() {
        // max lag 5: a series of length 15 yields 10 rows, exactly the
        // threshold, which must fail; 16 yields 11 rows and passes.
        let lags = LagSpec::target_only(vec![5]);
        let short = make_series("y", (0..15).map(|i| i as f64).collect());
        let model = fitted_model(&short, lags.clone());
        let result = build_feature_matrix(&model, &short, None, None, true, None, None);
        assert!(matches!(
            result,
            Err(ShapcastError::InsufficientData { needed: 11, got: 10 })
        ));

        let long = make_series("y", (0..16).map(|i| i as f64).collect());
        let model = fitted_model(&long, lags);
        let matrix = build_feature_matrix(&model, &long, None, None, true, None, None).unwrap();
        assert_eq!(matrix.n_rows(), MIN_BACKGROUND_SAMPLE + 1);
    }

    #[test]
    fn foreground_keeps_original_time_index() {
        let series = make_series("y", (0..30).map(|i| i as f64).collect());
        let model = fitted_model(&series, LagSpec::target_only(vec![2]));
        let matrix =
            build_feature_matrix(&model, &series, None, None, false, None, None).unwrap();

        assert_eq!(matrix.time_index.len(), 28);
        assert_eq!(matrix.time_index[0], series.timestamps()[2]);
        assert_eq!(
            *matrix.time_index.last().unwrap(),
            *series.timestamps().last().unwrap()
        );
    }

    #[test]
    fn sub_sampling_shrinks_rows_and_index_together() {
        let series = make_series("y", (0..60).map(|i| i as f64).collect());
        let model = fitted_model(&series, LagSpec::target_only(vec![1]));
        let matrix =
            build_feature_matrix(&model, &series, None, None, true, Some(20), Some(3)).unwrap();

        assert_eq!(matrix.n_rows(), 20);
        assert_eq!(matrix.time_index.len(), 20);
        // Time order is preserved under sampling.
        assert!(matrix.time_index.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn column_means_are_exact() {
        let matrix = FeatureMatrix {
            rows: vec![vec![1.0, 10.0], vec![3.0, 30.0]],
            columns: vec!["a".to_string(), "b".to_string()],
            time_index: vec![
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
            ],
        };
        assert_eq!(matrix.column_means(), vec![2.0, 20.0]);
    }
}
