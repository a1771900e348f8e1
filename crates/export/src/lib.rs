//! Export serializers for tensor showcase sessions.
//!
//! Turns a session's result log and metrics snapshot into a payload in one
//! of four formats and hands it to a sink.
//!
//! # Quick Start
//!
//! ```no_run
//! use tensor_showcase_core::SessionState;
//! use tensor_showcase_export::{ExportFormat, ExportSerializer, ExportSink, FileSink};
//!
//! let session = SessionState::new();
//! let payload = ExportSerializer::default()
//!     .export_session(ExportFormat::Html, &session, true)
//!     .unwrap();
//! FileSink::new("exports").save(&payload).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`payload`] - formats, filenames and MIME types
//! - [`json`] - the structured document
//! - [`tabular`] - metrics as CSV
//! - [`text`] - the plain-text report
//! - [`html`] - the HTML report
//! - [`io`] - sinks

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod html;
pub mod io;
pub mod json;
pub mod payload;
pub mod tabular;
pub mod text;

pub use error::{ExportError, Result};
pub use io::{ExportSink, FileSink};
pub use json::{ExportSummary, SessionExport};
pub use payload::{ExportFormat, ExportPayload};

use chrono::{DateTime, Utc};
use tensor_showcase_core::{MetricsSnapshot, ResultEntry, SessionState};
use tracing::debug;

/// Default report title.
pub const DEFAULT_TITLE: &str = "TensorFlow Operations Results";

/// Converts session data into export payloads.
#[derive(Debug, Clone)]
pub struct ExportSerializer {
    title: String,
}

impl Default for ExportSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl ExportSerializer {
    /// Serializer using `title` for report headers.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Report title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Export `results` and optional `performance` data, stamped now.
    pub fn export(
        &self,
        format: ExportFormat,
        results: &[ResultEntry],
        performance: Option<&MetricsSnapshot>,
    ) -> Result<ExportPayload> {
        self.export_at(format, results, performance, Utc::now())
    }

    /// Export stamped with an explicit time.
    ///
    /// `Csv` covers metrics only and ignores `results`; without performance
    /// data it contains just the header row.
    pub fn export_at(
        &self,
        format: ExportFormat,
        results: &[ResultEntry],
        performance: Option<&MetricsSnapshot>,
        at: DateTime<Utc>,
    ) -> Result<ExportPayload> {
        let bytes = match format {
            ExportFormat::Json => json::render(&self.title, at, results, performance)?,
            ExportFormat::Csv => {
                tabular::render(performance.map(|p| p.metrics.as_slice()).unwrap_or_default())?
            }
            ExportFormat::Txt => text::render(&self.title, at, results, performance)?.into_bytes(),
            ExportFormat::Html => html::render(&self.title, at, results, performance)?.into_bytes(),
        };

        metrics::counter!("showcase_exports_total", "format" => format.extension()).increment(1);
        debug!(
            %format,
            results = results.len(),
            with_performance = performance.is_some(),
            bytes = bytes.len(),
            "export serialized"
        );
        Ok(ExportPayload::new(format, bytes, at))
    }

    /// Export a whole session, optionally with a metrics snapshot.
    pub fn export_session(
        &self,
        format: ExportFormat,
        session: &SessionState,
        include_performance: bool,
    ) -> Result<ExportPayload> {
        let snapshot = include_performance.then(|| session.metrics.snapshot());
        self.export(format, session.results.entries(), snapshot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MockExportSink;
    use chrono::TimeZone;
    use tensor_showcase_core::{MetricRecorder, ResultLog};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn log() -> ResultLog {
        let mut log = ResultLog::new();
        log.append("Tensor Creation", "Tensor\n    [1, 2, 3]");
        log.append("Error", "<script>alert(1)</script>");
        log
    }

    fn snapshot() -> MetricsSnapshot {
        let mut recorder = MetricRecorder::new();
        recorder.record("Tensor Creation", 5.0, 100, 150);
        recorder.record("Reshape", 3.0, 150, 150);
        recorder.snapshot()
    }

    #[test]
    fn test_json_without_performance() {
        let payload = ExportSerializer::default()
            .export_at(ExportFormat::Json, log().entries(), None, fixed_time())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload.bytes).unwrap();

        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert!(value.get("performance").map_or(true, |p| p.is_null()));
        assert_eq!(value["summary"]["totalResults"], 2);
        assert_eq!(value["summary"]["totalOperations"], 0);
        assert_eq!(value["title"], DEFAULT_TITLE);
        assert_eq!(payload.mime, "application/json");
        assert_eq!(payload.filename, "tensorflow-results-2024-01-02T03-04-05-000Z.json");
    }

    #[test]
    fn test_json_with_performance() {
        let perf = snapshot();
        let payload = ExportSerializer::new("Session")
            .export_at(ExportFormat::Json, log().entries(), Some(&perf), fixed_time())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload.bytes).unwrap();

        assert_eq!(value["summary"]["totalOperations"], 2);
        assert_eq!(value["summary"]["averageExecutionTime"], 4.0);
        assert_eq!(value["performance"]["metrics"].as_array().unwrap().len(), 2);
        assert_eq!(value["performance"]["summary"]["peakMemory"], 150);
        assert_eq!(value["results"][0]["title"], "Tensor Creation");
    }

    #[test]
    fn test_csv_rows() {
        let perf = snapshot();
        let payload = ExportSerializer::default()
            .export_at(ExportFormat::Csv, &[], Some(&perf), fixed_time())
            .unwrap();
        let text = payload.text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "operation,executionTime,memoryBefore,memoryAfter,memoryDelta,timestamp"
        );
        assert!(lines[1].starts_with("Tensor Creation,5.0,100,150,50,"));
        assert!(lines[2].starts_with("Reshape,3.0,150,150,0,"));
        assert_eq!(payload.mime, "text/csv");
        assert!(payload.filename.starts_with("performance-metrics-"));
    }

    #[test]
    fn test_csv_without_metrics_is_header_only() {
        let payload = ExportSerializer::default()
            .export(ExportFormat::Csv, log().entries(), None)
            .unwrap();
        assert_eq!(payload.text().lines().count(), 1);
    }

    #[test]
    fn test_txt_layout() {
        let perf = snapshot();
        let payload = ExportSerializer::default()
            .export_at(ExportFormat::Txt, log().entries(), Some(&perf), fixed_time())
            .unwrap();
        let text = payload.text();

        assert!(text.starts_with(DEFAULT_TITLE));
        assert!(text.contains("=== Tensor Creation ===\nTensor\n    [1, 2, 3]\n"));
        assert!(text.contains("=== Performance Metrics ==="));
        assert!(text.contains("Average execution time: 4.000 ms"));

        let bare = ExportSerializer::default()
            .export_at(ExportFormat::Txt, log().entries(), None, fixed_time())
            .unwrap();
        assert!(!bare.text().contains("Performance Metrics"));
    }

    #[test]
    fn test_html_escapes_content() {
        let payload = ExportSerializer::default()
            .export_at(ExportFormat::Html, log().entries(), None, fixed_time())
            .unwrap();
        let html = payload.text();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("Performance Metrics"));
        assert_eq!(html.matches("class=\"result\"").count(), 2);
        assert_eq!(payload.mime, "text/html");
    }

    #[test]
    fn test_empty_session_exports_every_format() {
        let session = SessionState::new();
        for format in ExportFormat::ALL {
            let payload = ExportSerializer::default()
                .export_session(format, &session, false)
                .unwrap();
            assert!(!payload.bytes.is_empty(), "{format} produced nothing");
            assert!(payload.filename.ends_with(format.extension()));
        }
    }

    #[test]
    fn test_payload_handed_to_sink() {
        let mut sink = MockExportSink::new();
        sink.expect_save()
            .withf(|payload| payload.mime == "text/plain")
            .times(1)
            .returning(|_| Ok(()));

        let payload = ExportSerializer::default()
            .export(ExportFormat::Txt, log().entries(), None)
            .unwrap();
        sink.save(&payload).unwrap();
    }
}
