//! Export error types.

use thiserror::Error;

/// Errors raised while serializing or saving an export.
///
/// Missing optional input (no performance data, empty result log) is never
/// an error; the corresponding section is simply left out.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// Rendering a text document failed.
    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    /// Writing the payload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested format name is not known.
    #[error("Unknown export format '{0}' (expected json, csv, txt or html)")]
    UnknownFormat(String),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
