//! CSV metrics export.

use crate::error::{ExportError, Result};
use std::io;
use tensor_showcase_core::Metric;

/// Header row of the CSV export.
pub const HEADER: [&str; 6] = [
    "operation",
    "executionTime",
    "memoryBefore",
    "memoryAfter",
    "memoryDelta",
    "timestamp",
];

/// Render metrics as CSV: the header row, then one row per metric.
///
/// The header is written even when there are no metrics.
pub fn render(metrics: &[Metric]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for metric in metrics {
        writer.serialize(metric)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
}
