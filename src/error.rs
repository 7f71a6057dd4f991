//! Error types.

use thiserror::Error;

/// Errors raised by grid, feature-map and ranking operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SketchError {
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("feature map is not square: row {row} has {len} values, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("grid must be {expected}x{expected}, got {rows} rows (first bad row: {bad_row:?})")]
    GridShape {
        expected: usize,
        rows: usize,
        bad_row: Option<usize>,
    },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures at the classification service boundary.
///
/// All variants are reported to the user the same way; they stay distinct so
/// callers can log them precisely.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Status(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("a prediction is already in progress")]
    Busy,
}

/// Configuration loading and validation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration syntax: {0}")]
    Parse(String),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T, E = SketchError> = std::result::Result<T, E>;
