//! Error types for trust evaluation.

use thiserror::Error;

/// Trust evaluation errors.
#[derive(Debug, Error)]
pub enum TrustError {
    /// A reference model file could not be read or parsed.
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad {
        /// File path.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// A reference model has no usable features.
    #[error("Model {0} is empty")]
    EmptyModel(String),

    /// Feature vector length differs from the models.
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Model dimension.
        expected: usize,
        /// Record dimension.
        actual: usize,
    },

    /// Invalid trust configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrustError {
    /// A single bad record can be skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrustError::DimensionMismatch { .. })
    }

    /// Missing reference data stops the agent.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            TrustError::ModelLoad { .. } | TrustError::EmptyModel(_) | TrustError::InvalidConfig(_)
        )
    }
}

/// Result type for trust evaluation.
pub type Result<T> = std::result::Result<T, TrustError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let load = TrustError::ModelLoad {
            path: "x.csv".into(),
            reason: "missing".into(),
        };
        assert!(load.is_critical());
        assert!(!load.is_recoverable());
        assert!(TrustError::DimensionMismatch { expected: 3, actual: 2 }.is_recoverable());
    }
}
