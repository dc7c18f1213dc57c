//! Error types for diagram and surrogate computations.

use thiserror::Error;

/// Errors raised by the analysis core.
///
/// Every variant describes a precondition that failed before any numeric
/// work started. Degenerate numeric situations (zero-variance windows,
/// surrogates that do not converge) are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DxcError {
    /// Window geometry is not usable (zero widths, zero base width, ...).
    #[error("Invalid window geometry: {message}")]
    InvalidGeometry {
        /// Description of the offending parameter
        message: String,
    },

    /// The two analyzed sequences have different lengths.
    #[error("Sequence length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The geometry leaves no room for a single window center.
    #[error(
        "Windowing settings are invalid: sequence length {length} leaves no window \
         centers (base width {base_width}, {widths} widths, tau {tau})"
    )]
    EmptyDiagram {
        length: usize,
        base_width: usize,
        widths: usize,
        tau: usize,
    },

    /// Two tables that must share a shape do not.
    #[error("Diagram shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// A requested sequence index is outside the loaded matrix.
    #[error("Requested column {index} is out of range ({available} sequences loaded)")]
    ColumnOutOfRange { index: usize, available: usize },

    /// A p-value diagram was finalized before any trial was accumulated.
    #[error("No surrogate trials were accumulated")]
    NoTrials,

    /// Surrogate generation parameters are not usable.
    #[error("Invalid surrogate configuration: {message}")]
    InvalidSurrogateConfig { message: String },

    /// The worker pool for parallel trials could not be started.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}

impl DxcError {
    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DxcError>;
