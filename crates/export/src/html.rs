//! Self-contained HTML report generation.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};
use tensor_showcase_core::{MetricsSnapshot, ResultEntry};

const STYLE: &str = "\
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 2rem; color: #222; }
.header { background: #ff6f00; color: #fff; padding: 1.5rem; border-radius: 8px; }
.header p { margin: 0.25rem 0; }
.result { border: 1px solid #ddd; border-radius: 8px; margin: 1rem 0; padding: 1rem; }
.result h3 { margin-top: 0; color: #ff6f00; }
.result .timestamp { color: #888; font-size: 0.85rem; }
pre { background: #f5f5f5; padding: 0.75rem; border-radius: 4px; overflow-x: auto; }
.performance { background: #e3f2fd; border-radius: 8px; padding: 1rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; text-align: left; }";

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the HTML report.
pub fn render(
    title: &str,
    at: DateTime<Utc>,
    results: &[ResultEntry],
    performance: Option<&MetricsSnapshot>,
) -> Result<String> {
    let mut output = String::new();
    write_document(&mut output, title, at, results, performance)?;
    Ok(output)
}

fn write_document(
    out: &mut String,
    title: &str,
    at: DateTime<Utc>,
    results: &[ResultEntry],
    performance: Option<&MetricsSnapshot>,
) -> fmt::Result {
    let title = escape(title);
    let (operations, average) = performance
        .map(|p| (p.summary.total_operations, p.summary.average_execution_time_ms))
        .unwrap_or((0, 0.0));

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{title}</title>")?;
    writeln!(out, "<style>\n{STYLE}\n</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    writeln!(out, "<div class=\"header\">")?;
    writeln!(out, "<h1>{title}</h1>")?;
    writeln!(out, "<p>Generated: {}</p>", at.to_rfc3339())?;
    writeln!(out, "<p>Total results: {}</p>", results.len())?;
    writeln!(out, "<p>Total operations: {operations}</p>")?;
    writeln!(out, "<p>Average execution time: {average:.3} ms</p>")?;
    writeln!(out, "</div>")?;

    for result in results {
        writeln!(out, "<div class=\"result\">")?;
        writeln!(out, "<h3>{}</h3>", escape(&result.title))?;
        writeln!(
            out,
            "<div class=\"timestamp\">{}</div>",
            result.timestamp.to_rfc3339()
        )?;
        writeln!(out, "<pre>{}</pre>", escape(&result.content))?;
        writeln!(out, "</div>")?;
    }

    if let Some(performance) = performance {
        let summary = &performance.summary;
        writeln!(out, "<div class=\"performance\">")?;
        writeln!(out, "<h2>Performance Metrics</h2>")?;
        writeln!(out, "<p>Total memory delta: {} bytes</p>", summary.total_memory_delta_bytes)?;
        writeln!(out, "<p>Peak memory: {} bytes</p>", summary.peak_memory_after_bytes)?;
        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>Operation</th><th>Time (ms)</th><th>Memory before</th><th>Memory after</th><th>Delta</th></tr>"
        )?;
        for metric in &performance.metrics {
            writeln!(
                out,
                "<tr><td>{}</td><td>{:.3}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&metric.operation),
                metric.execution_time_ms,
                metric.memory_before_bytes,
                metric.memory_after_bytes,
                metric.memory_delta_bytes
            )?;
        }
        writeln!(out, "</table>")?;
        writeln!(out, "</div>")?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(())
}
