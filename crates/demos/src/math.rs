// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Arithmetic, reductions, linear algebra and activations.

use tensor_showcase_core::{ChartKind, ChartSpec, Demo, DemoOutput, Result, TensorOp, TensorScope};

fn as_f64(values: Vec<f32>) -> Vec<f64> {
    values.into_iter().map(f64::from).collect()
}

/// Elementwise add, subtract, multiply and divide.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathOps;

impl Demo for MathOps {
    fn name(&self) -> &str {
        "Mathematical Operations"
    }

    fn description(&self) -> &str {
        "Elementwise arithmetic on two vectors"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let a = scope.create("[1, 2, 3, 4]", None)?;
        let b = scope.create("[5, 6, 7, 8]", None)?;

        let mut narrative = format!(
            "a:\n{}\n\nb:\n{}\n",
            scope.render(a)?,
            scope.render(b)?
        );

        let mut chart = ChartSpec::new(
            ChartKind::Bar,
            (0..4).map(|i| format!("[{i}]")).collect(),
        );
        for (op, symbol) in [
            (TensorOp::Add, "+"),
            (TensorOp::Sub, "-"),
            (TensorOp::Mul, "*"),
            (TensorOp::Div, "/"),
        ] {
            let result = scope.binary(op, a, b)?;
            narrative.push_str(&format!("\na {symbol} b:\n{}\n", scope.render(result)?));
            chart = chart.with_series(format!("a {symbol} b"), as_f64(scope.values(result)?));
        }

        Ok(DemoOutput::new(narrative.trim_end()).with_chart(chart))
    }
}

/// Sum, mean, max and min of a matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reductions;

impl Demo for Reductions {
    fn name(&self) -> &str {
        "Reduction Operations"
    }

    fn description(&self) -> &str {
        "Reduce a matrix to scalars"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let matrix = scope.create("[[1, 2, 3], [4, 5, 6]]", None)?;
        let mut narrative = format!("Original tensor:\n{}\n", scope.render(matrix)?);

        let mut labels = Vec::new();
        let mut values = Vec::new();
        for op in [TensorOp::Sum, TensorOp::Mean, TensorOp::Max, TensorOp::Min] {
            let name = op.name();
            let reduced = scope.unary(op, matrix)?;
            let value = scope.scalar(reduced)?;
            narrative.push_str(&format!("\n{name}: {value}"));
            labels.push(name.to_string());
            values.push(f64::from(value));
        }

        let chart = ChartSpec::new(ChartKind::Bar, labels).with_series("value", values);
        Ok(DemoOutput::new(narrative).with_chart(chart))
    }
}

/// Matrix product and transpose.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixOps;

impl Demo for MatrixOps {
    fn name(&self) -> &str {
        "Matrix Operations"
    }

    fn description(&self) -> &str {
        "Matrix multiplication and transpose"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let a = scope.create("[[1, 2], [3, 4]]", None)?;
        let b = scope.create("[[5, 6], [7, 8]]", None)?;
        let product = scope.binary(TensorOp::MatMul, a, b)?;
        let transposed = scope.unary(TensorOp::Transpose, a)?;

        let narrative = format!(
            "Matrix A:\n{}\n\nMatrix B:\n{}\n\nA x B:\n{}\n\nTranspose of A:\n{}",
            scope.render(a)?,
            scope.render(b)?,
            scope.render(product)?,
            scope.render(transposed)?
        );
        Ok(DemoOutput::new(narrative))
    }
}

/// ReLU, sigmoid, tanh and softmax over a small range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Activations;

impl Activations {
    const INPUT: &'static str = "[-2, -1, 0, 1, 2]";
}

impl Demo for Activations {
    fn name(&self) -> &str {
        "Activation Functions"
    }

    fn description(&self) -> &str {
        "Common neural network activations"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let x = scope.create(Self::INPUT, None)?;
        let labels = scope
            .values(x)?
            .iter()
            .map(|v| v.to_string())
            .collect();

        let mut narrative = format!("Input:\n{}\n", scope.render(x)?);
        let mut chart = ChartSpec::new(ChartKind::Line, labels);
        let activations: [(TensorOp, &str); 4] = [
            (TensorOp::Relu, "ReLU"),
            (TensorOp::Sigmoid, "Sigmoid"),
            (TensorOp::Tanh, "Tanh"),
            (TensorOp::Softmax, "Softmax"),
        ];
        for (op, label) in activations {
            let y = scope.unary(op, x)?;
            narrative.push_str(&format!("\n{label}:\n{}\n", scope.render(y)?));
            chart = chart.with_series(label, as_f64(scope.values(y)?));
        }

        Ok(DemoOutput::new(narrative.trim_end()).with_chart(chart))
    }
}
