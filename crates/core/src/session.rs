// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-session state shared by the showcase components.

use crate::recorder::MetricRecorder;
use crate::results::ResultLog;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Everything recorded between session start and end.
///
/// Constructed explicitly and handed to whichever component needs it; there
/// is no process-wide instance.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Session identifier (UUID v4).
    pub id: Uuid,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Recent operation metrics.
    pub metrics: MetricRecorder,
    /// Demo output log.
    pub results: ResultLog,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Start a session with the default metric capacity.
    pub fn new() -> Self {
        Self::with_recorder(MetricRecorder::new())
    }

    /// Start a session retaining `capacity` metrics.
    pub fn with_metric_capacity(capacity: usize) -> Self {
        Self::with_recorder(MetricRecorder::with_capacity(capacity))
    }

    fn with_recorder(metrics: MetricRecorder) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            metrics,
            results: ResultLog::new(),
        }
    }

    /// Clear results and metrics, keeping the session identity.
    pub fn clear(&mut self) {
        self.metrics.clear();
        self.results.clear();
    }

    /// Time since the session started.
    pub fn uptime(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.started_at)
    }
}
