//! Error types for the N-Sink removal core

use thiserror::Error;

/// Main error type for removal-core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("input bundle is missing required layers: {}", keys.join(", "))]
    MissingInputs { keys: Vec<&'static str> },

    #[error("invalid raster dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for removal-core operations
pub type Result<T> = std::result::Result<T, Error>;
