//! JSON session export.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tensor_showcase_core::{MetricsSnapshot, ResultEntry};

/// Top-level counts of a session export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Number of result entries.
    pub total_results: usize,
    /// Number of recorded operations, zero without performance data.
    pub total_operations: usize,
    /// Mean execution time in milliseconds, zero without performance data.
    pub average_execution_time: f64,
}

/// The JSON export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    /// Report title.
    pub title: String,
    /// When the export was taken.
    pub timestamp: DateTime<Utc>,
    /// Result entries in display order.
    pub results: Vec<ResultEntry>,
    /// Metrics snapshot, absent when none was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<MetricsSnapshot>,
    /// Counts.
    pub summary: ExportSummary,
}

impl SessionExport {
    /// Assemble the document.
    pub fn new(
        title: &str,
        at: DateTime<Utc>,
        results: &[ResultEntry],
        performance: Option<&MetricsSnapshot>,
    ) -> Self {
        let (total_operations, average_execution_time) = performance
            .map(|p| (p.summary.total_operations, p.summary.average_execution_time_ms))
            .unwrap_or((0, 0.0));

        Self {
            title: title.to_string(),
            timestamp: at,
            results: results.to_vec(),
            performance: performance.cloned(),
            summary: ExportSummary {
                total_results: results.len(),
                total_operations,
                average_execution_time,
            },
        }
    }
}

/// Render the document as pretty-printed JSON.
pub fn render(
    title: &str,
    at: DateTime<Utc>,
    results: &[ResultEntry],
    performance: Option<&MetricsSnapshot>,
) -> Result<Vec<u8>> {
    let document = SessionExport::new(title, at, results, performance);
    Ok(serde_json::to_vec_pretty(&document)?)
}
