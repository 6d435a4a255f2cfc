//! Error types for the shapcast library.

use thiserror::Error;

/// Result type alias for shapcast operations.
pub type Result<T> = std::result::Result<T, ShapcastError>;

/// Errors that can occur during forecasting and explanation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapcastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model is not of a supported (regression-capable) family, or not usable yet.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Invalid configuration value, e.g. an unrecognized explanation method name.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid call argument, e.g. an unknown target name or an out-of-range horizon.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Resolved explanation method not handled by the engine builder.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before use")]
    FitRequired,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g. numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ShapcastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ShapcastError::InsufficientData { needed: 11, got: 5 };
        assert_eq!(err.to_string(), "insufficient data: need at least 11, got 5");

        let err = ShapcastError::InvalidModel("model must be fitted first".to_string());
        assert_eq!(err.to_string(), "invalid model: model must be fitted first");

        let err = ShapcastError::InvalidArgument("unknown target `load`".to_string());
        assert_eq!(err.to_string(), "invalid argument: unknown target `load`");

        let err = ShapcastError::UnsupportedMethod("gradient".to_string());
        assert_eq!(err.to_string(), "unsupported method: gradient");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ShapcastError::FitRequired;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
