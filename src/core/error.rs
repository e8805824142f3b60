//! Error types shared across the toolkit

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MlError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Position {position} out of range for vector of length {len}")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Singular matrix: no unique solution")]
    SingularMatrix,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, MlError>;
