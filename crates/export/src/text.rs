//! Plain-text report generation.
//!
//! Layout follows the result log's own `=== title ===` blocks so a text
//! export reads the same as the on-screen log.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};
use tensor_showcase_core::{MetricsSnapshot, ResultEntry};

/// Render the plain-text report.
pub fn render(
    title: &str,
    at: DateTime<Utc>,
    results: &[ResultEntry],
    performance: Option<&MetricsSnapshot>,
) -> Result<String> {
    let mut output = String::new();
    write_report(&mut output, title, at, results, performance)?;
    Ok(output)
}

fn write_report(
    output: &mut String,
    title: &str,
    at: DateTime<Utc>,
    results: &[ResultEntry],
    performance: Option<&MetricsSnapshot>,
) -> fmt::Result {
    writeln!(output, "{title}")?;
    writeln!(output, "Generated: {}", at.to_rfc3339())?;
    writeln!(output, "Total results: {}", results.len())?;
    writeln!(output)?;

    for result in results {
        writeln!(output, "=== {} ===", result.title)?;
        writeln!(output, "{}", result.content)?;
        writeln!(output)?;
    }

    if let Some(performance) = performance {
        let summary = &performance.summary;
        writeln!(output, "=== Performance Metrics ===")?;
        writeln!(output, "Total operations: {}", summary.total_operations)?;
        writeln!(
            output,
            "Average execution time: {:.3} ms",
            summary.average_execution_time_ms
        )?;
        writeln!(output, "Total memory delta: {} bytes", summary.total_memory_delta_bytes)?;
        writeln!(output, "Peak memory: {} bytes", summary.peak_memory_after_bytes)?;

        if !performance.metrics.is_empty() {
            writeln!(output)?;
            for metric in &performance.metrics {
                writeln!(
                    output,
                    "- {}: {:.3} ms, memory {} -> {} ({:+} bytes)",
                    metric.operation,
                    metric.execution_time_ms,
                    metric.memory_before_bytes,
                    metric.memory_after_bytes,
                    metric.memory_delta_bytes
                )?;
            }
        }
    }

    Ok(())
}
