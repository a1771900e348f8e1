// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Capacity-bounded operation metrics.
//!
//! [`MetricRecorder`] keeps the most recent timed measurements of demo and
//! benchmark invocations and derives a [`Summary`] from them on demand.
//!
//! # Invariants
//!
//! - At most `capacity` metrics are retained; each insertion beyond that
//!   evicts exactly one entry, the oldest.
//! - A [`Metric`] is never mutated after it is recorded.
//! - Aggregates over an empty recorder resolve to zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of metrics retained by a recorder.
pub const CAPACITY: usize = 100;

/// One timed and memory-sampled operation.
///
/// Serialized field names match the columns of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Operation label (usually the demo name).
    pub operation: String,
    /// Wall-clock execution time in milliseconds.
    #[serde(rename = "executionTime")]
    pub execution_time_ms: f64,
    /// Backend bytes in use before the operation.
    #[serde(rename = "memoryBefore")]
    pub memory_before_bytes: u64,
    /// Backend bytes in use after the operation.
    #[serde(rename = "memoryAfter")]
    pub memory_after_bytes: u64,
    /// `memory_after_bytes - memory_before_bytes`.
    #[serde(rename = "memoryDelta")]
    pub memory_delta_bytes: i64,
    /// When the metric was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Aggregate view over the retained metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of retained metrics.
    pub total_operations: usize,
    /// Arithmetic mean of execution times, in milliseconds.
    #[serde(rename = "averageExecutionTime")]
    pub average_execution_time_ms: f64,
    /// Sum of memory deltas, in bytes.
    #[serde(rename = "totalMemoryDelta")]
    pub total_memory_delta_bytes: i64,
    /// Highest `memory_after_bytes` among retained metrics.
    #[serde(rename = "peakMemory")]
    pub peak_memory_after_bytes: u64,
}

/// Point-in-time copy of a recorder, detached from its storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Summary at the time of the snapshot.
    pub summary: Summary,
    /// Retained metrics, oldest first.
    pub metrics: Vec<Metric>,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Append-only, FIFO-bounded log of [`Metric`]s.
#[derive(Debug, Clone)]
pub struct MetricRecorder {
    metrics: VecDeque<Metric>,
    capacity: usize,
}

impl Default for MetricRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRecorder {
    /// Create a recorder retaining [`CAPACITY`] metrics.
    pub fn new() -> Self {
        Self::with_capacity(CAPACITY)
    }

    /// Create a recorder with a custom capacity. Zero is clamped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            metrics: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record one operation.
    ///
    /// Inputs are stored as given; a negative execution time is kept, not
    /// rejected.
    pub fn record(
        &mut self,
        operation: impl Into<String>,
        execution_time_ms: f64,
        memory_before_bytes: u64,
        memory_after_bytes: u64,
    ) -> &Metric {
        self.metrics.push_back(Metric {
            operation: operation.into(),
            execution_time_ms,
            memory_before_bytes,
            memory_after_bytes,
            memory_delta_bytes: memory_after_bytes as i64 - memory_before_bytes as i64,
            timestamp: Utc::now(),
        });
        if self.metrics.len() > self.capacity {
            self.metrics.pop_front();
        }
        &self.metrics[self.metrics.len() - 1]
    }

    /// Derive the summary of the retained metrics.
    pub fn summary(&self) -> Summary {
        if self.metrics.is_empty() {
            return Summary::default();
        }

        let total_time: f64 = self.metrics.iter().map(|m| m.execution_time_ms).sum();
        Summary {
            total_operations: self.metrics.len(),
            average_execution_time_ms: total_time / self.metrics.len() as f64,
            total_memory_delta_bytes: self.metrics.iter().map(|m| m.memory_delta_bytes).sum(),
            peak_memory_after_bytes: self
                .metrics
                .iter()
                .map(|m| m.memory_after_bytes)
                .max()
                .unwrap_or(0),
        }
    }

    /// Drop every retained metric.
    pub fn clear(&mut self) {
        self.metrics.clear();
    }

    /// Take an owned snapshot of the current state.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            summary: self.summary(),
            metrics: self.metrics.iter().cloned().collect(),
            timestamp: Utc::now(),
        }
    }

    /// Iterate retained metrics, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Most recently recorded metric.
    pub fn latest(&self) -> Option<&Metric> {
        self.metrics.back()
    }

    /// Number of retained metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether no metric is retained.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Maximum number of retained metrics.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
