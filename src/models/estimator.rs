//! Estimator traits defining the common interface for tabular regressors.

use crate::error::Result;

/// Family tag for an estimator, used by the explanation method selector.
///
/// This is a closed set: mapping a new estimator family to a default
/// explanation method means adding one variant here and one arm to the
/// selector policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorFamily {
    /// Gradient boosting machines.
    GradientBoosting,
    /// Single decision trees.
    DecisionTree,
    /// Bagging/averaging ensembles.
    Ensemble,
    /// Nearest-neighbor regressors.
    Neighbors,
    /// Neural network regressors.
    NeuralNetwork,
    /// Gaussian process regressors.
    GaussianProcess,
    /// Linear models.
    Linear,
    /// Anything the policy table does not recognize.
    Other,
}

/// Linear model parameters exposed for explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCoefficients {
    /// One weight per feature column.
    pub weights: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
}

/// Native per-feature attributions along decision paths, with the model's
/// own expected value as baseline.
#[derive(Debug, Clone)]
pub struct PathContributions {
    /// Contribution of each feature, per row: `values[row][feature]`.
    pub values: Vec<Vec<f64>>,
    /// The model's internal expected output (root prediction).
    pub expected_value: f64,
}

/// Common interface for single-output tabular regressors.
///
/// This trait is object-safe and used with `Box<dyn Estimator>`.
pub trait Estimator {
    /// Fit the estimator on feature rows and one label per row.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict one value per feature row.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Display name of the estimator.
    fn name(&self) -> &str;

    /// Family tag for default explanation method selection.
    fn family(&self) -> EstimatorFamily;

    /// Linear parameters, if the estimator is linear.
    fn coefficients(&self) -> Option<LinearCoefficients> {
        None
    }

    /// Native decision-path attributions, if the estimator supports them.
    fn path_contributions(&self, x: &[Vec<f64>]) -> Option<Result<PathContributions>> {
        let _ = x;
        None
    }
}

/// Interface for estimators that natively emit a multi-output prediction,
/// covering all (horizon, target) pairs in one call.
pub trait JointEstimator {
    /// Fit on feature rows and a label matrix (one row per sample, one
    /// column per output).
    fn fit(&mut self, x: &[Vec<f64>], y: &[Vec<f64>]) -> Result<()>;

    /// Predict all outputs per row: `result[row][output]`.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Number of outputs (available after fitting).
    fn n_outputs(&self) -> usize;

    /// Display name of the estimator.
    fn name(&self) -> &str;

    /// Family tag for default explanation method selection.
    fn family(&self) -> EstimatorFamily;

    /// Linear parameters of one output, if the estimator is linear.
    fn coefficients(&self, output: usize) -> Option<LinearCoefficients> {
        let _ = output;
        None
    }
}
