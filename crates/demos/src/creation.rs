// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tensor construction from literals.

use tensor_showcase_core::{ChartKind, ChartSpec, Demo, DemoOutput, Result, TensorOp, TensorScope};

/// Builds a scalar, a vector, a matrix and a reshaped literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorCreation;

impl Demo for TensorCreation {
    fn name(&self) -> &str {
        "Tensor Creation"
    }

    fn description(&self) -> &str {
        "Create scalars, vectors and matrices from literals"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let scalar = scope.create("3.14", None)?;
        let vector = scope.create("[1, 2, 3, 4]", None)?;
        let matrix = scope.create("[[1, 2], [3, 4]]", None)?;
        let shaped = scope.create("[1, 2, 3, 4, 5, 6]", Some(&[2, 3]))?;

        let narrative = format!(
            "Scalar:\n{}\n\nVector:\n{}\n\nMatrix:\n{}\n\n\
             From flat values with shape {:?}:\n{}",
            scope.render(scalar)?,
            scope.render(vector)?,
            scope.render(matrix)?,
            scope.shape(shaped)?,
            scope.render(shaped)?
        );

        let values = scope.values(vector)?;
        let chart = ChartSpec::new(
            ChartKind::Bar,
            (0..values.len()).map(|i| format!("[{i}]")).collect(),
        )
        .with_series("vector", values.iter().map(|&v| f64::from(v)).collect());

        Ok(DemoOutput::new(narrative).with_chart(chart))
    }
}

/// Parses user supplied text into a tensor and describes it.
///
/// Malformed text fails the demo with a parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTensor {
    literal: String,
    shape: Option<Vec<usize>>,
}

impl Default for CustomTensor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LITERAL)
    }
}

impl CustomTensor {
    /// Literal used when none is supplied.
    pub const DEFAULT_LITERAL: &'static str = "[[1, 2, 3], [4, 5, 6]]";

    /// Demo for `literal`.
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            shape: None,
        }
    }

    /// Reshape the parsed values to `shape`.
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// The literal text.
    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl Demo for CustomTensor {
    fn name(&self) -> &str {
        "Custom Tensor"
    }

    fn description(&self) -> &str {
        "Parse a user supplied literal"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let tensor = scope.create(&self.literal, self.shape.as_deref())?;
        let shape = scope.shape(tensor)?;
        let size: usize = shape.iter().product();

        let mut narrative = format!(
            "Input: {}\n{}\nShape: {shape:?}\nSize: {size}",
            self.literal.trim(),
            scope.render(tensor)?
        );
        if size > 0 {
            let sum = scope.unary(TensorOp::Sum, tensor)?;
            let mean = scope.unary(TensorOp::Mean, tensor)?;
            narrative.push_str(&format!(
                "\nSum: {}\nMean: {}",
                scope.scalar(sum)?,
                scope.scalar(mean)?
            ));
        }
        Ok(DemoOutput::new(narrative))
    }
}
