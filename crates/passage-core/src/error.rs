//! Error types for index operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the vector index
#[derive(Debug, Error)]
pub enum CoreError {
    /// Vector length does not match the index dimensionality. The index is
    /// left unchanged when this is returned from an insert.
    #[error("dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid construction parameters
    #[error("invalid index options: {0}")]
    InvalidOptions(String),
}
