// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Explicit tensor release and memory accounting.

use tensor_showcase_core::{
    ChartKind, ChartSpec, Demo, DemoOutput, Distribution, MemoryUsage, Result, ShowcaseError,
    TensorOp, TensorScope,
};

/// Allocates tensors, releases some early and reports backend memory at
/// each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryManagement;

fn describe(label: &str, usage: MemoryUsage) -> String {
    format!(
        "{label}: {} tensors, {} bytes",
        usage.num_tensors, usage.bytes_in_use
    )
}

impl Demo for MemoryManagement {
    fn name(&self) -> &str {
        "Memory Management"
    }

    fn description(&self) -> &str {
        "Release intermediate tensors before the demo ends"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let before = scope.memory_usage();

        let kept = scope.create("[[1, 2], [3, 4]]", None)?;
        let large = scope.random(Distribution::standard_normal(), &[100, 100], None)?;
        let squared = scope.unary(TensorOp::Square, large)?;
        let allocated = scope.memory_usage();

        for handle in [squared, large] {
            if !scope.release(handle) {
                return Err(ShowcaseError::external(format!(
                    "{handle} was not held by the scope"
                )));
            }
        }
        let released = scope.memory_usage();

        let narrative = [
            describe("Before", before),
            describe("After allocating 3 tensors", allocated),
            describe("After releasing 2 intermediates", released),
            format!("Still held:\n{}", scope.render(kept)?),
        ]
        .join("\n");

        let chart = ChartSpec::new(
            ChartKind::Bar,
            vec!["before".into(), "allocated".into(), "released".into()],
        )
        .with_series(
            "bytes",
            [before, allocated, released]
                .iter()
                .map(|u| u.bytes_in_use as f64)
                .collect(),
        );
        Ok(DemoOutput::new(narrative).with_chart(chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_showcase_core::{HostBackend, TensorBackend};

    #[test]
    fn test_intermediates_released_early() {
        let mut backend = HostBackend::new();
        let mut scope = TensorScope::new(&mut backend);
        let output = MemoryManagement.execute(&mut scope).unwrap();

        assert_eq!(scope.held(), 1);
        assert!(output.narrative.contains("Before: 0 tensors, 0 bytes"));
        assert!(output
            .narrative
            .contains("After allocating 3 tensors: 3 tensors, 80016 bytes"));
        assert!(output
            .narrative
            .contains("After releasing 2 intermediates: 1 tensors, 16 bytes"));
        assert_eq!(
            output.chart.unwrap().series[0].values,
            vec![0.0, 80016.0, 16.0]
        );

        drop(scope);
        assert_eq!(backend.memory_usage(), MemoryUsage::default());
    }
}
