// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Demo orchestration.
//!
//! Each call to [`DemoOrchestrator::run`] walks one demo through the state
//! machine
//!
//! ```text
//! Idle -> Running -> Succeeded | Failed -> Idle
//! ```
//!
//! While `Running`, every tensor the demo acquires goes through a
//! [`TensorScope`] and is released before the state machine leaves
//! `Running`, on both exit paths. A failure is appended to the result log
//! under the title `"Error"` and never reaches the caller, so one broken
//! demo cannot take the session down.

use crate::backend::{HostBackend, MemoryUsage, TensorBackend};
use crate::benchmark::{BenchmarkReport, BenchmarkRunner};
use crate::chart::{ChartSpec, VisualizationSink};
use crate::monitor::PerformanceReading;
use crate::scope::TensorScope;
use crate::session::SessionState;
use crate::{Result, ShowcaseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Title of result entries produced by failed demos.
pub const ERROR_TITLE: &str = "Error";

/// A named, fixed sequence of backend operations.
pub trait Demo {
    /// Name used as the metric label and result title.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str {
        ""
    }

    /// Run the sequence, acquiring tensors only through `scope`.
    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput>;
}

/// What a successful demo produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoOutput {
    /// Step-by-step text narrative.
    pub narrative: String,
    /// Optional chart for the visualization sink.
    pub chart: Option<ChartSpec>,
}

impl DemoOutput {
    /// Output with a narrative only.
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            chart: None,
        }
    }

    /// Attach a chart.
    pub fn with_chart(mut self, chart: ChartSpec) -> Self {
        self.chart = Some(chart);
        self
    }
}

/// States of the per-invocation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrchestratorState {
    /// Ready for the next demo.
    Idle,
    /// A demo sequence is executing.
    Running,
    /// The last sequence completed.
    Succeeded,
    /// The last sequence failed.
    Failed,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one [`DemoOrchestrator::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum DemoOutcome {
    /// The demo completed and was recorded.
    Succeeded {
        /// Wall-clock time of the sequence in milliseconds.
        elapsed_ms: f64,
        /// Backend bytes after the sequence minus bytes before it.
        memory_delta_bytes: i64,
        /// Tensors released when leaving `Running`.
        released: usize,
    },
    /// The demo failed; the error was logged.
    Failed {
        /// The failure.
        error: ShowcaseError,
        /// Tensors released when leaving `Running`.
        released: usize,
    },
}

impl DemoOutcome {
    /// Whether the demo completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Tensors released when the demo left `Running`.
    pub fn released(&self) -> usize {
        match self {
            Self::Succeeded { released, .. } | Self::Failed { released, .. } => *released,
        }
    }
}

/// Runs demos against a backend and records them into a session.
pub struct DemoOrchestrator<B: TensorBackend = HostBackend> {
    backend: B,
    session: SessionState,
    sink: Option<Box<dyn VisualizationSink>>,
    state: OrchestratorState,
}

impl DemoOrchestrator<HostBackend> {
    /// Orchestrator over a fresh [`HostBackend`] and session.
    pub fn with_host_backend() -> Self {
        Self::new(HostBackend::new(), SessionState::new())
    }
}

impl<B: TensorBackend> DemoOrchestrator<B> {
    /// Create an orchestrator owning `backend` and `session`.
    pub fn new(backend: B, session: SessionState) -> Self {
        Self {
            backend,
            session,
            sink: None,
            state: OrchestratorState::Idle,
        }
    }

    /// Forward demo charts to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn VisualizationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the visualization sink.
    pub fn set_sink(&mut self, sink: Option<Box<dyn VisualizationSink>>) {
        self.sink = sink;
    }

    /// Current state. Always `Idle` between calls.
    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Mutable session state.
    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend memory accounting.
    pub fn memory_usage(&self) -> MemoryUsage {
        self.backend.memory_usage()
    }

    /// Current reading for the performance display.
    pub fn performance_reading(&self, memory_budget_bytes: u64) -> PerformanceReading {
        PerformanceReading::capture(
            self.backend.memory_usage(),
            &self.session.metrics.summary(),
            memory_budget_bytes,
        )
    }

    /// Clear results and metrics.
    pub fn clear(&mut self) {
        self.session.clear();
        info!(session = %self.session.id, "session cleared");
    }

    fn transition(&mut self, next: OrchestratorState, demo: &str) {
        debug!(demo, from = %self.state, to = %next, "orchestrator transition");
        self.state = next;
    }

    /// Run one demo to a terminal state and return to `Idle`.
    pub fn run(&mut self, demo: &dyn Demo) -> DemoOutcome {
        let name = demo.name().to_string();
        self.transition(OrchestratorState::Running, &name);

        let start = Instant::now();
        let memory_before = self.backend.memory_usage().bytes_in_use;

        let (result, elapsed_ms, memory_after, released) = {
            let mut scope = TensorScope::new(&mut self.backend);
            let result = demo.execute(&mut scope);
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            let memory_after = scope.memory_usage().bytes_in_use;
            let released = scope.release_all();
            (result, elapsed_ms, memory_after, released)
        };

        let outcome = match result {
            Ok(output) => {
                self.session
                    .metrics
                    .record(&name, elapsed_ms, memory_before, memory_after);
                self.session.results.append(&name, output.narrative);
                if let (Some(chart), Some(sink)) = (output.chart.as_ref(), self.sink.as_mut()) {
                    sink.render(chart);
                }
                self.transition(OrchestratorState::Succeeded, &name);

                ::metrics::counter!("showcase_demo_runs_total", "status" => "succeeded").increment(1);
                ::metrics::histogram!("showcase_demo_duration_ms").record(elapsed_ms);
                info!(demo = %name, elapsed_ms, released, "demo completed");

                DemoOutcome::Succeeded {
                    elapsed_ms,
                    memory_delta_bytes: memory_after as i64 - memory_before as i64,
                    released,
                }
            }
            Err(error) => {
                self.transition(OrchestratorState::Failed, &name);
                self.session.results.append(ERROR_TITLE, error.to_string());

                ::metrics::counter!("showcase_demo_runs_total", "status" => "failed").increment(1);
                warn!(demo = %name, error = %error, released, "demo failed");

                DemoOutcome::Failed { error, released }
            }
        };

        self.transition(OrchestratorState::Idle, &name);
        outcome
    }

    /// Run demos in order; a failing demo does not stop the rest.
    pub fn run_all<'d, I>(&mut self, demos: I) -> Vec<DemoOutcome>
    where
        I: IntoIterator<Item = &'d dyn Demo>,
    {
        demos.into_iter().map(|demo| self.run(demo)).collect()
    }

    /// Benchmark a demo over `iterations` sequential runs.
    ///
    /// Each iteration gets its own scope. The report is appended to the
    /// result log and its average time recorded as a metric labelled
    /// `benchmark:<name>`. Failures are returned, not logged.
    pub fn benchmark(&mut self, demo: &dyn Demo, iterations: usize) -> Result<BenchmarkReport> {
        let name = demo.name().to_string();
        let memory_before = self.backend.memory_usage().bytes_in_use;

        let report = BenchmarkRunner::benchmark(&mut self.backend, iterations, |backend: &mut B| {
            let mut scope = TensorScope::new(backend);
            demo.execute(&mut scope).map(|_| ())
        })?;

        let memory_after = self.backend.memory_usage().bytes_in_use;
        let label = format!("benchmark:{name}");
        self.session
            .metrics
            .record(&label, report.average_time_ms, memory_before, memory_after);
        self.session
            .results
            .append(format!("Benchmark: {name}"), format_report(&report));

        info!(
            demo = %name,
            iterations,
            average_ms = report.average_time_ms,
            "benchmark recorded"
        );
        Ok(report)
    }
}

fn format_report(report: &BenchmarkReport) -> String {
    format!(
        "Iterations: {}\nAverage time: {:.3} ms\nMin time: {:.3} ms\nMax time: {:.3} ms\nMemory delta: {} bytes",
        report.iterations,
        report.average_time_ms,
        report.min_time_ms,
        report.max_time_ms,
        report.memory_delta_bytes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TensorOp;
    use crate::chart::{ChartKind, MockVisualizationSink};

    struct SquareDemo;

    impl Demo for SquareDemo {
        fn name(&self) -> &str {
            "square"
        }

        fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
            let a = scope.create("[1, 2, 3]", None)?;
            let squared = scope.unary(TensorOp::Square, a)?;
            let values = scope.values(squared)?;
            let chart = ChartSpec::new(ChartKind::Bar, vec!["a".into(), "b".into(), "c".into()])
                .with_series("x^2", values.iter().map(|v| f64::from(*v)).collect());
            Ok(DemoOutput::new(scope.render(squared)?).with_chart(chart))
        }
    }

    struct BrokenDemo;

    impl Demo for BrokenDemo {
        fn name(&self) -> &str {
            "broken"
        }

        fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
            let a = scope.create("[1, 2, 3]", None)?;
            let b = scope.create("[[1, 2]]", None)?;
            scope.binary(TensorOp::MatMul, a, b)?;
            Ok(DemoOutput::new("unreachable"))
        }
    }

    #[test]
    fn test_successful_run_records_everything() {
        let mut sink = MockVisualizationSink::new();
        sink.expect_render()
            .withf(|chart| chart.series[0].values == vec![1.0, 4.0, 9.0])
            .times(1)
            .return_const(());

        let mut orchestrator = DemoOrchestrator::with_host_backend().with_sink(Box::new(sink));
        let outcome = orchestrator.run(&SquareDemo);

        assert!(outcome.is_success());
        assert_eq!(outcome.released(), 2);
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
        assert_eq!(orchestrator.session().metrics.len(), 1);
        assert_eq!(orchestrator.session().metrics.latest().unwrap().operation, "square");
        assert_eq!(orchestrator.session().metrics.latest().unwrap().memory_after_bytes, 24);
        assert_eq!(orchestrator.session().results.last().unwrap().title, "square");
        assert_eq!(orchestrator.memory_usage(), MemoryUsage::default());
    }

    #[test]
    fn test_failed_run_logs_error_and_skips_metrics() {
        let mut sink = MockVisualizationSink::new();
        sink.expect_render().times(0);

        let mut orchestrator = DemoOrchestrator::with_host_backend().with_sink(Box::new(sink));
        let outcome = orchestrator.run(&BrokenDemo);

        assert!(!outcome.is_success());
        assert_eq!(outcome.released(), 2);
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
        assert!(orchestrator.session().metrics.is_empty());

        let entry = orchestrator.session().results.last().unwrap();
        assert_eq!(entry.title, ERROR_TITLE);
        assert!(entry.content.contains("matMul"));
        assert_eq!(orchestrator.memory_usage().num_tensors, 0);
    }

    #[test]
    fn test_failure_does_not_block_next_demo() {
        let mut orchestrator = DemoOrchestrator::with_host_backend();
        let demos: [&dyn Demo; 3] = [&SquareDemo, &BrokenDemo, &SquareDemo];
        let outcomes = orchestrator.run_all(demos);

        let successes: Vec<bool> = outcomes.iter().map(DemoOutcome::is_success).collect();
        assert_eq!(successes, vec![true, false, true]);
        assert_eq!(orchestrator.session().metrics.len(), 2);
        assert_eq!(orchestrator.session().results.len(), 3);
    }

    #[test]
    fn test_benchmark_records_report() {
        let mut orchestrator = DemoOrchestrator::with_host_backend();
        let report = orchestrator.benchmark(&SquareDemo, 3).unwrap();

        assert_eq!(report.iterations, 3);
        assert_eq!(report.memory_delta_bytes, 0);
        assert_eq!(
            orchestrator.session().metrics.latest().unwrap().operation,
            "benchmark:square"
        );
        assert_eq!(orchestrator.session().results.last().unwrap().title, "Benchmark: square");
    }

    #[test]
    fn test_benchmark_rejects_zero_iterations() {
        let mut orchestrator = DemoOrchestrator::with_host_backend();
        let err = orchestrator.benchmark(&SquareDemo, 0).unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));
        assert!(orchestrator.session().results.is_empty());
    }

    #[test]
    fn test_performance_reading_uses_budget() {
        let mut orchestrator = DemoOrchestrator::with_host_backend();
        orchestrator.run(&SquareDemo);
        let reading = orchestrator.performance_reading(1024);
        assert_eq!(reading.total_operations, 1);
        assert_eq!(reading.memory_bytes, 0);
        assert_eq!(reading.memory_percent, 0.0);
    }
}
