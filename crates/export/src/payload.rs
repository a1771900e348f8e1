//! Export formats and the payload handed to a sink.

use crate::error::ExportError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// Filename stem for session exports.
pub const RESULTS_STEM: &str = "tensorflow-results";

/// Filename stem for metrics-only exports.
pub const METRICS_STEM: &str = "performance-metrics";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Structured JSON document.
    Json,
    /// Metrics as comma-separated rows.
    Csv,
    /// Plain text report.
    Txt,
    /// Self-contained HTML report.
    Html,
}

impl ExportFormat {
    /// Every supported format.
    pub const ALL: [ExportFormat; 4] = [Self::Json, Self::Csv, Self::Txt, Self::Html];

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Html => "html",
        }
    }

    /// MIME type of the payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Txt => "text/plain",
            Self::Html => "text/html",
        }
    }

    /// Suggested filename for an export taken at `at`.
    pub fn filename(self, at: DateTime<Utc>) -> String {
        let stem = match self {
            Self::Csv => METRICS_STEM,
            Self::Json | Self::Txt | Self::Html => RESULTS_STEM,
        };
        format!("{stem}-{}.{}", file_timestamp(at), self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" | "text" => Ok(Self::Txt),
            "html" => Ok(Self::Html),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// ISO-8601 timestamp with `:` and `.` replaced by `-`, safe for filenames.
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(|c: char| c == ':' || c == '.', "-")
}

/// Serialized export ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Encoded document.
    pub bytes: Vec<u8>,
    /// Suggested filename.
    pub filename: String,
    /// MIME type.
    pub mime: &'static str,
}

impl ExportPayload {
    /// Build a payload for `format` taken at `at`.
    pub fn new(format: ExportFormat, bytes: Vec<u8>, at: DateTime<Utc>) -> Self {
        Self {
            bytes,
            filename: format.filename(at),
            mime: format.mime_type(),
        }
    }

    /// Payload as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}
