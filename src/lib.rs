//! # shapcast
//!
//! SHAP-based explainability for lag-based time series regression models,
//! with anomaly scoring over probabilistic forecasts.
//!
//! Fit a [`models::RegressionModel`] on lagged features, then build an
//! [`explain::ShapExplainer`] to attribute each forecast to the lagged
//! target and covariate values it was computed from. Explanations come
//! back as [`core::TimeSeries`] keyed by forecast horizon and target
//! component, regardless of whether the model wraps one joint multi-output
//! estimator or an independent estimator per (horizon, target) pair.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod ad;
pub mod core;
pub mod error;
pub mod explain;
pub mod lagged;
pub mod models;
pub mod utils;

pub use error::{Result, ShapcastError};

pub mod prelude {
    pub use crate::core::TimeSeries;
    pub use crate::error::{Result, ShapcastError};
    pub use crate::explain::{
        EngineOptions, FeaturePerturbation, Foreground, ShapConfig, ShapExplainer,
        ShapExplanation, ShapMethod,
    };
    pub use crate::lagged::LagSpec;
    pub use crate::models::{Estimator, JointEstimator, RegressionModel};
}
