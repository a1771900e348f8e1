// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chart descriptions handed to a visualization sink.

use serde::{Deserialize, Serialize};

/// Chart style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Line chart.
    Line,
    /// Bar chart.
    Bar,
    /// Doughnut chart.
    Doughnut,
}

/// One labelled data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Legend label.
    pub label: String,
    /// One value per chart label.
    pub values: Vec<f64>,
}

/// A chart ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Category labels, in display order.
    pub labels: Vec<String>,
    /// Data series, in display order.
    pub series: Vec<Series>,
    /// Chart style.
    pub kind: ChartKind,
}

impl ChartSpec {
    /// Create a chart without series.
    pub fn new(kind: ChartKind, labels: Vec<String>) -> Self {
        Self {
            labels,
            series: Vec::new(),
            kind,
        }
    }

    /// Add a series.
    pub fn with_series(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.push(Series {
            label: label.into(),
            values,
        });
        self
    }
}

/// Rendering target for charts. Nothing is returned to the caller.
#[cfg_attr(test, mockall::automock)]
pub trait VisualizationSink {
    /// Render `chart`.
    fn render(&mut self, chart: &ChartSpec);
}
