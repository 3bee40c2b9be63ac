//! Error types for factor-lasso.

use thiserror::Error;

/// Error type for factor-lasso operations.
#[derive(Debug, Error)]
pub enum LassoError {
    /// Row or length mismatch between the design matrix, target and coefficients.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    /// Argument outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Normal-equations matrix is not invertible.
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// Design column with zero norm.
    #[error("Degenerate column {column}: zero norm")]
    DegenerateColumn { column: usize },

    /// Reference QP solver did not finish with an optimal status.
    #[error("Solver error: {0}")]
    SolverError(String),
}

impl LassoError {
    pub(crate) fn row_mismatch(expected: usize, got: usize) -> Self {
        LassoError::DimensionMismatch {
            expected: format!("{} rows", expected),
            got: format!("{} rows", got),
        }
    }

    pub(crate) fn length_mismatch(expected: usize, got: usize) -> Self {
        LassoError::DimensionMismatch {
            expected: format!("length {}", expected),
            got: format!("length {}", got),
        }
    }
}

/// Result type for factor-lasso operations.
pub type Result<T> = std::result::Result<T, LassoError>;
