//! Terminal rendering of charts and performance readings.

use colored::{Color, Colorize};
use std::fmt;
use tensor_showcase_core::{ChartKind, ChartSpec, PerformanceReading, VisualizationSink};

/// Widest bar, in characters.
pub const BAR_WIDTH: usize = 40;

const PALETTE: [Color; 4] = [Color::Cyan, Color::Yellow, Color::Magenta, Color::Green];

/// Prints charts as horizontal bars on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalChart;

impl VisualizationSink for TerminalChart {
    fn render(&mut self, chart: &ChartSpec) {
        print!("{}", render_bars(chart));
    }
}

/// Length of a bar for `value` when `max` fills `width` characters.
pub fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !value.is_finite() {
        return 0;
    }
    ((value.abs() / max) * width as f64).round().min(width as f64) as usize
}

/// Render every series of `chart` as labelled horizontal bars.
pub fn render_bars(chart: &ChartSpec) -> String {
    Bars(chart).to_string()
}

struct Bars<'a>(&'a ChartSpec);

impl fmt::Display for Bars<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chart = self.0;
        let max = chart
            .series
            .iter()
            .flat_map(|s| s.values.iter())
            .map(|v| v.abs())
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max);
        let label_width = chart.labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let glyph = match chart.kind {
            ChartKind::Line => "·",
            ChartKind::Bar | ChartKind::Doughnut => "█",
        };

        for (index, series) in chart.series.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            writeln!(f, "{}", series.label.as_str().bold())?;
            for (label, value) in chart.labels.iter().zip(&series.values) {
                let bar = glyph.repeat(bar_len(*value, max, BAR_WIDTH));
                let bar = if *value < 0.0 {
                    bar.as_str().red()
                } else {
                    bar.as_str().color(color)
                };
                writeln!(f, "  {label:>label_width$} │{bar} {value:.3}")?;
            }
        }
        Ok(())
    }
}

/// One-line summary of a performance reading.
pub fn format_reading(reading: &PerformanceReading) -> String {
    format!(
        "[{}] memory {} bytes ({:.2}%), tensors {}, operations {}, avg {:.3} ms",
        reading.timestamp.format("%H:%M:%S"),
        reading.memory_bytes,
        reading.memory_percent,
        reading.num_tensors,
        reading.total_operations,
        reading.average_execution_ms
    )
}
