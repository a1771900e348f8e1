// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shape manipulation.

use tensor_showcase_core::{Demo, DemoOutput, Result, TensorOp, TensorScope};

/// Reshapes a six element vector and transposes the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reshape;

impl Demo for Reshape {
    fn name(&self) -> &str {
        "Tensor Reshaping"
    }

    fn description(&self) -> &str {
        "Reshape a vector into matrices and transpose"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let original = scope.create("[1, 2, 3, 4, 5, 6]", None)?;
        let two_by_three = scope.unary(TensorOp::Reshape(vec![2, 3]), original)?;
        let three_by_two = scope.unary(TensorOp::Reshape(vec![3, 2]), original)?;
        let transposed = scope.unary(TensorOp::Transpose, two_by_three)?;

        let narrative = format!(
            "Original tensor:\n{}\n\nReshaped to [2, 3]:\n{}\n\nReshaped to [3, 2]:\n{}\n\n\
             Transpose of [2, 3]:\n{}",
            scope.render(original)?,
            scope.render(two_by_three)?,
            scope.render(three_by_two)?,
            scope.render(transposed)?
        );
        Ok(DemoOutput::new(narrative))
    }
}
