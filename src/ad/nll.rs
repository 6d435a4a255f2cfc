//! Negative log-likelihood anomaly scorers.
//!
//! Each time step of a probabilistic forecast carries a population of
//! sampled values. A scorer fits a distribution to that population by
//! maximum likelihood and scores the observed value by its negative
//! log-likelihood: the less probable the observation, the higher the
//! score. An optional trailing window smooths the raw scores.

use crate::core::TimeSeries;
use crate::error::{Result, ShapcastError};
use statrs::distribution::{Continuous, Discrete, Normal, Poisson};

fn validate_inputs(samples: &[Vec<f64>], actual: &[f64]) -> Result<()> {
    if samples.len() != actual.len() {
        return Err(ShapcastError::DimensionMismatch {
            expected: actual.len(),
            got: samples.len(),
        });
    }
    if samples.iter().any(Vec::is_empty) {
        return Err(ShapcastError::EmptyData);
    }
    Ok(())
}

/// Trailing moving average of width `window`.
fn smooth(scores: Vec<f64>, window: usize) -> Vec<f64> {
    if window <= 1 {
        return scores;
    }
    (0..scores.len())
        .map(|t| {
            let start = (t + 1).saturating_sub(window);
            let slice = &scores[start..=t];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Scores observations under a Gaussian fitted to each step's samples.
#[derive(Debug, Clone)]
pub struct GaussianNllScorer {
    window: usize,
}

impl Default for GaussianNllScorer {
    fn default() -> Self {
        Self { window: 1 }
    }
}

impl GaussianNllScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smooth raw scores with a trailing window of `window` steps.
    pub fn with_window(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ShapcastError::InvalidArgument(
                "window must be >= 1".to_string(),
            ));
        }
        Ok(Self { window })
    }

    /// Score each observation: `samples[t]` is the forecast sample
    /// population for step `t`, `actual[t]` the observed value.
    pub fn score(&self, samples: &[Vec<f64>], actual: &[f64]) -> Result<Vec<f64>> {
        validate_inputs(samples, actual)?;
        let scores = samples
            .iter()
            .zip(actual.iter())
            .map(|(population, &x)| {
                let n = population.len() as f64;
                let mean = population.iter().sum::<f64>() / n;
                let variance =
                    population.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                // Degenerate populations get a tiny spread so the density
                // stays defined.
                let std_dev = variance.sqrt().max(1e-12);
                let normal = Normal::new(mean, std_dev)
                    .map_err(|e| ShapcastError::ComputationError(e.to_string()))?;
                Ok(-normal.ln_pdf(x))
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(smooth(scores, self.window))
    }

    /// Score against a univariate series, preserving its time index.
    pub fn score_series(&self, samples: &[Vec<f64>], actual: &TimeSeries) -> Result<TimeSeries> {
        let scores = self.score(samples, actual.primary_values())?;
        TimeSeries::new(
            actual.timestamps().to_vec(),
            vec![scores],
            vec!["nll".to_string()],
        )
    }
}

/// Scores count-valued observations under a Poisson fitted to each step's
/// samples.
#[derive(Debug, Clone)]
pub struct PoissonNllScorer {
    window: usize,
}

impl Default for PoissonNllScorer {
    fn default() -> Self {
        Self { window: 1 }
    }
}

impl PoissonNllScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smooth raw scores with a trailing window of `window` steps.
    pub fn with_window(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ShapcastError::InvalidArgument(
                "window must be >= 1".to_string(),
            ));
        }
        Ok(Self { window })
    }

    /// Score each observation. Observed values must be non-negative
    /// integers, since the Poisson mass function is defined over counts.
    pub fn score(&self, samples: &[Vec<f64>], actual: &[f64]) -> Result<Vec<f64>> {
        validate_inputs(samples, actual)?;
        let scores = samples
            .iter()
            .zip(actual.iter())
            .map(|(population, &x)| {
                if x < 0.0 || x.fract() != 0.0 {
                    return Err(ShapcastError::InvalidArgument(format!(
                        "poisson scoring requires non-negative integer observations, got {x}"
                    )));
                }
                let mean = population.iter().sum::<f64>() / population.len() as f64;
                let lambda = mean.max(1e-12);
                let poisson = Poisson::new(lambda)
                    .map_err(|e| ShapcastError::ComputationError(e.to_string()))?;
                Ok(-poisson.ln_pmf(x as u64))
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(smooth(scores, self.window))
    }

    /// Score against a univariate series, preserving its time index.
    pub fn score_series(&self, samples: &[Vec<f64>], actual: &TimeSeries) -> Result<TimeSeries> {
        let scores = self.score(samples, actual.primary_values())?;
        TimeSeries::new(
            actual.timestamps().to_vec(),
            vec![scores],
            vec!["nll".to_string()],
        )
    }
}
