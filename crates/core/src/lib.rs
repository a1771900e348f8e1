// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core of the tensor operations showcase.
//!
//! A session is a sequence of demo invocations against a numeric backend.
//! This crate records what those invocations print and how long they take:
//!
//! - [`recorder`] - capacity-bounded [`MetricRecorder`] and its [`Summary`]
//! - [`results`] - the session's [`ResultLog`]
//! - [`benchmark`] - [`BenchmarkRunner`] timing and memory instrumentation
//! - [`backend`] - the [`TensorBackend`] capability and [`HostBackend`]
//! - [`scope`] - [`TensorScope`], release-on-every-exit tensor ownership
//! - [`orchestrator`] - the [`DemoOrchestrator`] state machine
//! - [`monitor`] - the periodic [`PerformanceMonitor`]
//! - [`config`] - layered [`ShowcaseConfig`]
//!
//! # Example
//!
//! ```
//! use tensor_showcase_core::{Demo, DemoOrchestrator, DemoOutput, Result, TensorScope};
//!
//! struct Hello;
//!
//! impl Demo for Hello {
//!     fn name(&self) -> &str {
//!         "hello"
//!     }
//!
//!     fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
//!         let t = scope.create("[1, 2, 3]", None)?;
//!         Ok(DemoOutput::new(scope.render(t)?))
//!     }
//! }
//!
//! let mut orchestrator = DemoOrchestrator::with_host_backend();
//! assert!(orchestrator.run(&Hello).is_success());
//! assert_eq!(orchestrator.session().results.len(), 1);
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod backend;
pub mod benchmark;
pub mod chart;
pub mod config;
pub mod error;
pub mod monitor;
pub mod orchestrator;
pub mod recorder;
pub mod results;
pub mod scope;
pub mod session;

pub use backend::{Distribution, HostBackend, MemoryUsage, TensorBackend, TensorHandle, TensorOp};
pub use benchmark::{BenchmarkReport, BenchmarkRunner, BenchmarkSample, Measured, RepeatedMeasurement};
pub use chart::{ChartKind, ChartSpec, Series, VisualizationSink};
pub use crate::config::ShowcaseConfig;
pub use error::{Result, ShowcaseError};
pub use recorder::{Metric, MetricRecorder, MetricsSnapshot, Summary};
pub use monitor::{PerformanceMonitor, PerformanceReading};
pub use orchestrator::{Demo, DemoOrchestrator, DemoOutcome, DemoOutput, OrchestratorState};
pub use results::{ResultEntry, ResultLog};
pub use scope::TensorScope;
pub use session::SessionState;
