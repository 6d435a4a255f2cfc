//! TimeSeries data structure for representing temporal data.

use crate::error::{Result, ShapcastError};
use chrono::{DateTime, Duration, Utc};

/// A time series over one or more named components.
///
/// Values are stored column-major: `values[component][observation]`.
/// Timestamps must be strictly increasing. A series is immutable once
/// constructed; transformations return new instances.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Vec<f64>>,
    components: Vec<String>,
}

impl TimeSeries {
    /// Create a multivariate series from column-major values and component names.
    ///
    /// If `components` is empty, names default to `"0"`, `"1"`, ...
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<Vec<f64>>,
        components: Vec<String>,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(ShapcastError::EmptyData);
        }
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ShapcastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }
        for column in &values {
            if column.len() != timestamps.len() {
                return Err(ShapcastError::DimensionMismatch {
                    expected: timestamps.len(),
                    got: column.len(),
                });
            }
        }
        let components = if components.is_empty() {
            (0..values.len()).map(|i| i.to_string()).collect()
        } else {
            if components.len() != values.len() {
                return Err(ShapcastError::DimensionMismatch {
                    expected: values.len(),
                    got: components.len(),
                });
            }
            components
        };

        Ok(Self {
            timestamps,
            values,
            components,
        })
    }

    /// Create a univariate series with the default component name `"0"`.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(timestamps, vec![values], vec![])
    }

    /// Reconstruct a series from a time index and row-major values.
    ///
    /// `rows[i][j]` holds the value of column `j` at `time_index[i]`. This is
    /// the inverse of the tabular layout produced by explanation engines and
    /// is used to map raw explanation arrays back to calendar time.
    pub fn from_times_and_values(
        time_index: Vec<DateTime<Utc>>,
        rows: &[Vec<f64>],
        columns: Vec<String>,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(ShapcastError::EmptyData);
        }
        if rows.len() != time_index.len() {
            return Err(ShapcastError::DimensionMismatch {
                expected: time_index.len(),
                got: rows.len(),
            });
        }
        let dims = rows[0].len();
        for row in rows {
            if row.len() != dims {
                return Err(ShapcastError::DimensionMismatch {
                    expected: dims,
                    got: row.len(),
                });
            }
        }
        let values: Vec<Vec<f64>> = (0..dims)
            .map(|d| rows.iter().map(|row| row[d]).collect())
            .collect();
        Self::new(time_index, values, columns)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of components (1 for univariate).
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    /// Timestamps of the series.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Component names, in storage order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Values of a component by positional index.
    pub fn values(&self, dimension: usize) -> Result<&[f64]> {
        self.values
            .get(dimension)
            .map(|v| v.as_slice())
            .ok_or(ShapcastError::IndexOutOfBounds {
                index: dimension,
                size: self.values.len(),
            })
    }

    /// Values of a component by name.
    pub fn component_values(&self, name: &str) -> Result<&[f64]> {
        let idx = self
            .components
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| {
                ShapcastError::InvalidArgument(format!("unknown component `{name}`"))
            })?;
        Ok(&self.values[idx])
    }

    /// Values of the first component.
    pub fn primary_values(&self) -> &[f64] {
        self.values.first().map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Observation at `index` across all components.
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.len() {
            return Err(ShapcastError::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok(self.values.iter().map(|dim| dim[index]).collect())
    }

    /// Extract `[start, end)` as a new series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ShapcastError::InvalidArgument(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ShapcastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self
                .values
                .iter()
                .map(|dim| dim[start..end].to_vec())
                .collect(),
            components: self.components.clone(),
        })
    }

    /// Infer the fixed spacing between consecutive observations.
    ///
    /// Fails if the series is shorter than two points or irregularly spaced.
    pub fn regular_step(&self) -> Result<Duration> {
        if self.len() < 2 {
            return Err(ShapcastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }
        let step = self.timestamps[1] - self.timestamps[0];
        for w in self.timestamps.windows(2) {
            if w[1] - w[0] != step {
                return Err(ShapcastError::TimestampError(
                    "series is not regularly spaced".to_string(),
                ));
            }
        }
        Ok(step)
    }
}
