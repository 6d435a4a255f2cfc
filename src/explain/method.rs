//! Explanation method enumeration and the default selection policy.

use crate::error::{Result, ShapcastError};
use crate::models::EstimatorFamily;
use std::fmt;
use std::str::FromStr;

/// Explanation algorithm applied to one estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapMethod {
    Tree,
    Gradient,
    Deep,
    Kernel,
    Sampling,
    Partition,
    Linear,
    Permutation,
    Additive,
}

impl ShapMethod {
    /// All recognized method names, lowercase.
    pub const NAMES: [&'static str; 9] = [
        "tree",
        "gradient",
        "deep",
        "kernel",
        "sampling",
        "partition",
        "linear",
        "permutation",
        "additive",
    ];

    /// Lowercase name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapMethod::Tree => "tree",
            ShapMethod::Gradient => "gradient",
            ShapMethod::Deep => "deep",
            ShapMethod::Kernel => "kernel",
            ShapMethod::Sampling => "sampling",
            ShapMethod::Partition => "partition",
            ShapMethod::Linear => "linear",
            ShapMethod::Permutation => "permutation",
            ShapMethod::Additive => "additive",
        }
    }
}

impl fmt::Display for ShapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapMethod {
    type Err = ShapcastError;

    /// Case-insensitive resolution of a method name.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(ShapMethod::Tree),
            "gradient" => Ok(ShapMethod::Gradient),
            "deep" => Ok(ShapMethod::Deep),
            "kernel" => Ok(ShapMethod::Kernel),
            "sampling" => Ok(ShapMethod::Sampling),
            "partition" => Ok(ShapMethod::Partition),
            "linear" => Ok(ShapMethod::Linear),
            "permutation" => Ok(ShapMethod::Permutation),
            "additive" => Ok(ShapMethod::Additive),
            other => Err(ShapcastError::InvalidConfiguration(format!(
                "unrecognized shap method `{other}`; valid methods: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

/// Default method for an estimator family.
///
/// The policy is static data: tree-based families get the tree method,
/// linear models the linear method, ensemble/neighbor/neural/process
/// families the permutation method. Anything unrecognized falls back to
/// the kernel method, the model-agnostic (and most expensive) baseline.
pub fn default_method(family: EstimatorFamily) -> ShapMethod {
    match family {
        EstimatorFamily::GradientBoosting | EstimatorFamily::DecisionTree => ShapMethod::Tree,
        EstimatorFamily::Linear => ShapMethod::Linear,
        EstimatorFamily::Ensemble
        | EstimatorFamily::Neighbors
        | EstimatorFamily::NeuralNetwork
        | EstimatorFamily::GaussianProcess => ShapMethod::Permutation,
        EstimatorFamily::Other => ShapMethod::Kernel,
    }
}

/// Resolve the method for one estimator: an explicit choice wins, otherwise
/// the family policy applies.
pub fn select(family: EstimatorFamily, explicit: Option<ShapMethod>) -> ShapMethod {
    explicit.unwrap_or_else(|| default_method(family))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_covers_all_families() {
        assert_eq!(
            default_method(EstimatorFamily::GradientBoosting),
            ShapMethod::Tree
        );
        assert_eq!(default_method(EstimatorFamily::DecisionTree), ShapMethod::Tree);
        assert_eq!(default_method(EstimatorFamily::Linear), ShapMethod::Linear);
        assert_eq!(
            default_method(EstimatorFamily::Ensemble),
            ShapMethod::Permutation
        );
        assert_eq!(
            default_method(EstimatorFamily::Neighbors),
            ShapMethod::Permutation
        );
        assert_eq!(
            default_method(EstimatorFamily::NeuralNetwork),
            ShapMethod::Permutation
        );
        assert_eq!(
            default_method(EstimatorFamily::GaussianProcess),
            ShapMethod::Permutation
        );
        assert_eq!(default_method(EstimatorFamily::Other), ShapMethod::Kernel);
    }

    #[test]
    fn explicit_method_wins_over_policy() {
        assert_eq!(
            select(EstimatorFamily::Linear, Some(ShapMethod::Kernel)),
            ShapMethod::Kernel
        );
        assert_eq!(select(EstimatorFamily::Linear, None), ShapMethod::Linear);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("TREE".parse::<ShapMethod>().unwrap(), ShapMethod::Tree);
        assert_eq!("Kernel".parse::<ShapMethod>().unwrap(), ShapMethod::Kernel);
        assert_eq!(
            "permutation".parse::<ShapMethod>().unwrap(),
            ShapMethod::Permutation
        );
    }

    #[test]
    fn unknown_name_lists_valid_methods() {
        let err = "lime".parse::<ShapMethod>().unwrap_err();
        match err {
            ShapcastError::InvalidConfiguration(message) => {
                for name in ShapMethod::NAMES {
                    assert!(message.contains(name), "missing `{name}` in `{message}`");
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn display_round_trips() {
        for name in ShapMethod::NAMES {
            let method: ShapMethod = name.parse().unwrap();
            assert_eq!(method.to_string(), name);
        }
    }
}
