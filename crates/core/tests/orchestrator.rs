// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end orchestrator behaviour against a backend that audits every
//! allocation and release.

use std::collections::HashMap;
use tensor_showcase_core::{
    Demo, DemoOrchestrator, DemoOutput, Distribution, HostBackend, MemoryUsage, OrchestratorState,
    Result, SessionState, ShowcaseError, TensorBackend, TensorHandle, TensorOp, TensorScope,
};

/// Wraps [`HostBackend`], counting disposals per handle and failing the
/// n-th operation on request.
#[derive(Default)]
struct AuditingBackend {
    inner: HostBackend,
    created: Vec<TensorHandle>,
    disposals: HashMap<TensorHandle, usize>,
    calls: usize,
    fail_on_call: Option<usize>,
}

impl AuditingBackend {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    fn step(&mut self) -> Result<()> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err(ShowcaseError::external(format!(
                "kernel crashed on step {}",
                self.calls
            )));
        }
        Ok(())
    }

    fn track(&mut self, handle: Result<TensorHandle>) -> Result<TensorHandle> {
        let handle = handle?;
        self.created.push(handle);
        Ok(handle)
    }
}

impl TensorBackend for AuditingBackend {
    fn create(&mut self, literal: &str, shape: Option<&[usize]>) -> Result<TensorHandle> {
        self.step()?;
        let handle = self.inner.create(literal, shape);
        self.track(handle)
    }

    fn from_values(&mut self, values: Vec<f32>, shape: &[usize]) -> Result<TensorHandle> {
        self.step()?;
        let handle = self.inner.from_values(values, shape);
        self.track(handle)
    }

    fn random(
        &mut self,
        distribution: Distribution,
        shape: &[usize],
        seed: Option<u64>,
    ) -> Result<TensorHandle> {
        self.step()?;
        let handle = self.inner.random(distribution, shape, seed);
        self.track(handle)
    }

    fn apply(&mut self, op: &TensorOp, inputs: &[TensorHandle]) -> Result<TensorHandle> {
        self.step()?;
        let handle = self.inner.apply(op, inputs);
        self.track(handle)
    }

    fn values(&self, handle: TensorHandle) -> Result<Vec<f32>> {
        self.inner.values(handle)
    }

    fn shape(&self, handle: TensorHandle) -> Result<Vec<usize>> {
        self.inner.shape(handle)
    }

    fn memory_usage(&self) -> MemoryUsage {
        self.inner.memory_usage()
    }

    fn dispose(&mut self, handle: TensorHandle) {
        *self.disposals.entry(handle).or_default() += 1;
        self.inner.dispose(handle);
    }
}

/// Five backend steps: create, create, add, square, sum.
struct FiveStepDemo;

impl Demo for FiveStepDemo {
    fn name(&self) -> &str {
        "five-steps"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let mut narrative = String::new();
        let a = scope.create("[1, 2, 3]", None)?;
        let b = scope.create("[4, 5, 6]", None)?;
        narrative.push_str(&format!("a:\n{}\nb:\n{}\n", scope.render(a)?, scope.render(b)?));
        let sum = scope.binary(TensorOp::Add, a, b)?;
        let squared = scope.unary(TensorOp::Square, sum)?;
        let total = scope.unary(TensorOp::Sum, squared)?;
        narrative.push_str(&format!("sum of squares: {}", scope.scalar(total)?));
        Ok(DemoOutput::new(narrative))
    }
}

fn assert_each_released_once(backend: &AuditingBackend) {
    for handle in &backend.created {
        assert_eq!(
            backend.disposals.get(handle).copied(),
            Some(1),
            "{handle} must be released exactly once"
        );
    }
    assert_eq!(backend.memory_usage(), MemoryUsage::default());
}

#[test]
fn test_step_three_failure_is_logged_and_cleaned_up() {
    let mut orchestrator = DemoOrchestrator::new(AuditingBackend::failing_on(3), SessionState::new());
    orchestrator.session_mut().results.append("earlier", "kept");
    orchestrator.session_mut().metrics.record("earlier", 1.0, 0, 0);

    let outcome = orchestrator.run(&FiveStepDemo);

    assert!(!outcome.is_success());
    assert_eq!(outcome.released(), 2);
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);

    let results = orchestrator.session().results.entries();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "earlier");
    assert_eq!(results[1].title, "Error");
    assert!(results[1].content.contains("kernel crashed on step 3"));

    let metrics = &orchestrator.session().metrics;
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics.latest().unwrap().operation, "earlier");

    let backend = orchestrator.backend();
    assert_eq!(backend.created.len(), 2);
    assert_each_released_once(backend);
}

#[test]
fn test_successful_sequence_records_metric_and_result() {
    let mut orchestrator = DemoOrchestrator::new(AuditingBackend::default(), SessionState::new());
    let outcome = orchestrator.run(&FiveStepDemo);

    assert!(outcome.is_success());
    assert_eq!(outcome.released(), 5);

    let entry = orchestrator.session().results.last().unwrap();
    assert_eq!(entry.title, "five-steps");
    assert!(entry.content.contains("sum of squares: 155"));

    let metric = orchestrator.session().metrics.latest().unwrap();
    assert_eq!(metric.operation, "five-steps");
    assert_eq!(metric.memory_before_bytes, 0);
    // three 3-element tensors, one 3-element square, one scalar
    assert_eq!(metric.memory_after_bytes, 4 * (3 + 3 + 3 + 3 + 1));

    assert_each_released_once(orchestrator.backend());
}

#[test]
fn test_parse_error_surfaces_as_error_entry() {
    struct BadLiteral;

    impl Demo for BadLiteral {
        fn name(&self) -> &str {
            "bad-literal"
        }

        fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
            scope.create("[1, 2, 3]", None)?;
            scope.create("[[1, 2], [3]]", None)?;
            Ok(DemoOutput::new("unreachable"))
        }
    }

    let mut orchestrator = DemoOrchestrator::new(AuditingBackend::default(), SessionState::new());
    let outcome = orchestrator.run(&BadLiteral);
    assert!(!outcome.is_success());

    let entry = orchestrator.session().results.last().unwrap();
    assert_eq!(entry.title, "Error");
    assert!(entry.content.starts_with("Parse error"));
    assert!(orchestrator.session().metrics.is_empty());
    assert_each_released_once(orchestrator.backend());

    // The session keeps working afterwards.
    assert!(orchestrator.run(&FiveStepDemo).is_success());
    assert_eq!(orchestrator.session().metrics.len(), 1);
}
