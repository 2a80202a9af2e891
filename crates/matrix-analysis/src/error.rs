//! Error types for matrix-analysis

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, analyzing or persisting matrices
#[derive(Debug, Error)]
pub enum MatrixAnalysisError {
    /// A size parameter is negative
    #[error("Invalid dimension: {name} = {value}, size parameters must be non-negative")]
    InvalidDimension { name: &'static str, value: i64 },

    /// A block extent derived from the size parameters does not fit in `usize`
    #[error("Dimension overflow while computing {name}")]
    DimensionOverflow { name: &'static str },

    /// Square matrix required
    #[error("Matrix must be square, got ({nrows}, {ncols})")]
    NonSquareMatrix { nrows: usize, ncols: usize },

    /// Symmetric matrix required
    #[error("Matrix must be symmetric, max |a_ij - a_ji| = {max_asymmetry:e}")]
    NotSymmetric { max_asymmetry: f64 },

    /// Blocks cannot be concatenated along the requested axis
    #[error("Shape mismatch: expected ({expected_rows}, {expected_cols}), got ({actual_rows}, {actual_cols})")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// Concatenation of an empty list of blocks
    #[error("Cannot concatenate an empty list of blocks")]
    EmptyConcatenation,

    /// Flat buffer length does not match the requested shape
    #[error("Data length {len} does not match shape ({nrows}, {ncols})")]
    InvalidLength { len: usize, nrows: usize, ncols: usize },

    /// Tolerance must be finite and non-negative
    #[error("Invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),

    /// Filesystem failure while writing or reading an artifact
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed content in a saved matrix or archive
    #[error("Failed to parse {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Rendering backend failure
    #[error("Plotting failed: {0}")]
    Plot(String),

    /// An artifact task panicked
    #[error("Artifact '{name}' panicked: {message}")]
    ArtifactPanicked { name: String, message: String },

    /// JSON serialization failure
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl MatrixAnalysisError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for matrix-analysis operations
pub type Result<T> = std::result::Result<T, MatrixAnalysisError>;
