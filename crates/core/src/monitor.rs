// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Periodic performance sampling.
//!
//! [`PerformanceMonitor`] runs on the current thread's tokio [`LocalSet`]:
//! its ticker only fires between other tasks' turns, so a reading is never
//! taken in the middle of a demo step. The monitor has an explicit
//! start/stop lifecycle; starting an already running monitor restarts it.
//!
//! [`LocalSet`]: tokio::task::LocalSet

use crate::backend::MemoryUsage;
use crate::recorder::Summary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default sampling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default memory budget used for the usage percentage (100 MiB).
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 100 * 1024 * 1024;

/// One sample for the performance display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReading {
    /// Backend bytes in use.
    pub memory_bytes: u64,
    /// `memory_bytes` as a percentage of the memory budget.
    pub memory_percent: f64,
    /// Live backend tensors.
    pub num_tensors: usize,
    /// Mean execution time of the retained metrics, in milliseconds.
    pub average_execution_ms: f64,
    /// Number of retained metrics.
    pub total_operations: usize,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
}

impl PerformanceReading {
    /// Build a reading from backend accounting and a metrics summary.
    pub fn capture(usage: MemoryUsage, summary: &Summary, memory_budget_bytes: u64) -> Self {
        let memory_percent = if memory_budget_bytes == 0 {
            0.0
        } else {
            usage.bytes_in_use as f64 / memory_budget_bytes as f64 * 100.0
        };
        Self {
            memory_bytes: usage.bytes_in_use,
            memory_percent,
            num_tensors: usage.num_tensors,
            average_execution_ms: summary.average_execution_time_ms,
            total_operations: summary.total_operations,
            timestamp: Utc::now(),
        }
    }
}

/// Single-threaded periodic sampler.
#[derive(Debug)]
pub struct PerformanceMonitor {
    interval: Duration,
    token: Option<CancellationToken>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl PerformanceMonitor {
    /// Create a stopped monitor ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            token: None,
        }
    }

    /// Sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start sampling: every interval, `source` is read and the reading is
    /// passed to `subscriber`. The first reading arrives one interval after
    /// the call.
    ///
    /// Must be called from within a [`tokio::task::LocalSet`].
    pub fn start<S, F>(&mut self, source: S, mut subscriber: F)
    where
        S: Fn() -> PerformanceReading + 'static,
        F: FnMut(PerformanceReading) + 'static,
    {
        self.stop();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let interval = self.interval;

        tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let reading = source();
                        debug!(
                            memory_bytes = reading.memory_bytes,
                            num_tensors = reading.num_tensors,
                            "performance sample"
                        );
                        subscriber(reading);
                    }
                }
            }
        });

        self.token = Some(token);
        info!(interval_ms = interval.as_millis() as u64, "performance monitor started");
    }

    /// Stop sampling. Returns whether the monitor was running.
    pub fn stop(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                token.cancel();
                info!("performance monitor stopped");
                true
            }
            None => false,
        }
    }

    /// Whether the monitor is sampling.
    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
