//! SHAP-based model explainability for regression forecasting models.
//!
//! The orchestration layer maps any underlying estimator layout (joint
//! multi-output or per-(horizon, target) ensemble) onto one horizon-indexed,
//! target-indexed explanation structure.

mod dispatch;
mod engine;
mod matrix;
mod method;
mod shap;

pub use engine::{EngineOptions, FeaturePerturbation};
pub use matrix::{FeatureMatrix, MIN_BACKGROUND_SAMPLE};
pub use method::ShapMethod;
pub use shap::{
    FeatureImportance, ForceValues, Foreground, ShapConfig, ShapExplainer, ShapExplanation,
    TargetExplanation,
};
