// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Timing and memory instrumentation for arbitrary operations.
//!
//! Iterations always run sequentially on the calling thread so samples are
//! never skewed by interleaving. Any failure of the measured operation is
//! returned to the caller untouched and the samples gathered so far are
//! discarded.

use crate::backend::TensorBackend;
use crate::ShowcaseError;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Result of a single timed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    /// Wall-clock time of the call in milliseconds.
    pub elapsed_ms: f64,
    /// Value returned by the call.
    pub value: T,
}

/// One timing sample of a repeated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSample {
    /// Zero-based iteration index.
    pub iteration_index: usize,
    /// Wall-clock time of the iteration in milliseconds.
    pub elapsed_ms: f64,
}

/// Result of [`BenchmarkRunner::measure_repeated`].
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedMeasurement<T> {
    /// Sum of all samples, in milliseconds.
    pub total_ms: f64,
    /// `total_ms / iterations`.
    pub average_ms: f64,
    /// Samples in iteration order.
    pub samples: Vec<BenchmarkSample>,
    /// Value returned by each call, in iteration order.
    pub results: Vec<T>,
}

/// Summary statistics of [`BenchmarkRunner::benchmark`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    /// Number of iterations run.
    pub iterations: usize,
    /// Mean iteration time in milliseconds.
    #[serde(rename = "averageTime")]
    pub average_time_ms: f64,
    /// Fastest iteration in milliseconds.
    #[serde(rename = "minTime")]
    pub min_time_ms: f64,
    /// Slowest iteration in milliseconds.
    #[serde(rename = "maxTime")]
    pub max_time_ms: f64,
    /// Backend bytes after the run minus bytes before it.
    #[serde(rename = "memoryDelta")]
    pub memory_delta_bytes: i64,
    /// Every iteration time, in iteration order.
    pub raw_times: Vec<f64>,
}

/// Runs operations under timing and memory instrumentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Invoke `operation` once and time it.
    pub fn measure_once<T, E, F>(operation: F) -> Result<Measured<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let start = Instant::now();
        let value = operation()?;
        Ok(Measured {
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            value,
        })
    }

    /// Invoke `operation` `iterations` times in sequence.
    ///
    /// Fails with [`ShowcaseError::InvalidArgument`] before any call when
    /// `iterations` is zero, and stops at the first failing call.
    pub fn measure_repeated<T, E, F>(
        mut operation: F,
        iterations: usize,
    ) -> Result<RepeatedMeasurement<T>, E>
    where
        F: FnMut() -> Result<T, E>,
        E: From<ShowcaseError>,
    {
        ensure_iterations(iterations)?;

        let mut samples = Vec::with_capacity(iterations);
        let mut results = Vec::with_capacity(iterations);
        for iteration_index in 0..iterations {
            let measured = Self::measure_once(&mut operation)?;
            samples.push(BenchmarkSample {
                iteration_index,
                elapsed_ms: measured.elapsed_ms,
            });
            results.push(measured.value);
        }

        let total_ms: f64 = samples.iter().map(|s| s.elapsed_ms).sum();
        Ok(RepeatedMeasurement {
            total_ms,
            average_ms: total_ms / iterations as f64,
            samples,
            results,
        })
    }

    /// Benchmark `operation` against `backend`.
    ///
    /// Memory is sampled once before the first iteration and once after the
    /// last; each iteration receives the backend.
    pub fn benchmark<B, T, E, F>(
        backend: &mut B,
        iterations: usize,
        mut operation: F,
    ) -> Result<BenchmarkReport, E>
    where
        B: TensorBackend + ?Sized,
        F: FnMut(&mut B) -> Result<T, E>,
        E: From<ShowcaseError>,
    {
        ensure_iterations(iterations)?;

        let before = backend.memory_usage().bytes_in_use;
        let measurement = Self::measure_repeated(|| operation(&mut *backend), iterations)?;
        let after = backend.memory_usage().bytes_in_use;

        let raw_times: Vec<f64> = measurement.samples.iter().map(|s| s.elapsed_ms).collect();
        let min_time_ms = raw_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_time_ms = raw_times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let report = BenchmarkReport {
            iterations,
            average_time_ms: measurement.average_ms,
            min_time_ms,
            max_time_ms,
            memory_delta_bytes: after as i64 - before as i64,
            raw_times,
        };
        debug!(
            iterations,
            average_ms = report.average_time_ms,
            min_ms = report.min_time_ms,
            max_ms = report.max_time_ms,
            memory_delta = report.memory_delta_bytes,
            "benchmark finished"
        );
        Ok(report)
    }
}

fn ensure_iterations(iterations: usize) -> Result<(), ShowcaseError> {
    if iterations == 0 {
        return Err(ShowcaseError::invalid_argument(
            "iterations must be at least 1",
        ));
    }
    Ok(())
}
