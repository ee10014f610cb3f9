//! Error types for the visuomotor SOM engine.

use thiserror::Error;

/// The main error type for visuomotor map operations.
#[derive(Error, Debug)]
pub enum VisMotorError {
    /// Bad map shape or initialization parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Input vector length does not match the expected dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Invalid argument to an operation (e.g. a non-positive step size).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Index out of bounds.
    #[error("Index out of range: {index} >= {max}")]
    IndexOutOfRange {
        /// The index that was out of bounds.
        index: usize,
        /// The exclusive upper bound.
        max: usize,
    },

    /// Gaze direction falls outside the visual field lattice.
    #[error("Gaze out of range: {0}")]
    GazeOutOfRange(String),

    /// A recalled motor command violates the configured joint limits.
    #[error("Unsafe command: joint {joint} = {value} outside [{low}, {high}]")]
    UnsafeCommand {
        /// Joint index.
        joint: usize,
        /// Offending value.
        value: f64,
        /// Lower limit.
        low: f64,
        /// Upper limit.
        high: f64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed sample data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for visuomotor operations.
pub type Result<T> = std::result::Result<T, VisMotorError>;

impl From<serde_json::Error> for VisMotorError {
    fn from(err: serde_json::Error) -> Self {
        VisMotorError::Config(err.to_string())
    }
}

impl VisMotorError {
    /// Convenience constructor for a length check failure.
    pub(crate) fn dimension(expected: usize, actual: usize) -> Self {
        VisMotorError::DimensionMismatch { expected, actual }
    }
}
