//! Regression estimators and the lag-based forecasting model built on them.

mod estimator;

pub mod linear;
pub mod neighbors;
pub mod regression;
pub mod tree;

pub use estimator::{
    Estimator, EstimatorFamily, JointEstimator, LinearCoefficients, PathContributions,
};
pub use linear::{LinearRegressor, MultiLinearRegressor};
pub use neighbors::KNeighborsRegressor;
pub use regression::{EstimatorLayout, RegressionModel};
pub use tree::RegressionTree;
