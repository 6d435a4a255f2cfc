//! Anomaly scoring utilities.
//!
//! Scores observed values against probabilistic forecasts.

mod nll;

pub use nll::{GaussianNllScorer, PoissonNllScorer};
