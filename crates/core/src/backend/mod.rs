// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Numeric backend capability.
//!
//! The showcase never does tensor math itself: every demo talks to a
//! [`TensorBackend`], which owns the tensor storage and hands out opaque
//! [`TensorHandle`]s. [`HostBackend`] is the in-process implementation used
//! by the command line and the tests.

mod host;
mod parse;

pub use host::HostBackend;
pub use parse::parse_tensor_literal;

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a tensor owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorHandle(u64);

impl TensorHandle {
    /// Wrap a backend-assigned id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Backend-assigned id.
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor#{}", self.0)
    }
}

/// Memory accounting reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Bytes held by live tensors.
    pub bytes_in_use: u64,
    /// Number of live tensors.
    pub num_tensors: usize,
}

/// Operations a backend applies to existing tensors.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorOp {
    /// Elementwise `a + b`.
    Add,
    /// Elementwise `a - b`.
    Sub,
    /// Elementwise `a * b`.
    Mul,
    /// Elementwise `a / b`.
    Div,
    /// Matrix product of two rank-2 tensors.
    MatMul,
    /// Swap the axes of a rank-2 tensor.
    Transpose,
    /// Reinterpret with a new shape of the same size.
    Reshape(Vec<usize>),
    /// `max(x, 0)`.
    Relu,
    /// Logistic sigmoid.
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// `x * x`.
    Square,
    /// Square root.
    Sqrt,
    /// Natural exponential.
    Exp,
    /// Absolute value.
    Abs,
    /// Sum of all elements.
    Sum,
    /// Mean of all elements.
    Mean,
    /// Largest element.
    Max,
    /// Smallest element.
    Min,
    /// Softmax over the last axis.
    Softmax,
}

impl TensorOp {
    /// Short lowercase name, as used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::MatMul => "matMul",
            Self::Transpose => "transpose",
            Self::Reshape(_) => "reshape",
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Square => "square",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Abs => "abs",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Min => "min",
            Self::Softmax => "softmax",
        }
    }

    /// Number of input tensors the operation takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::MatMul => 2,
            _ => 1,
        }
    }
}

/// Distribution used to fill random tensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Gaussian with the given mean and standard deviation.
    Normal {
        /// Mean.
        mean: f32,
        /// Standard deviation, must not be negative.
        std_dev: f32,
    },
    /// Uniform over `[low, high)`.
    Uniform {
        /// Inclusive lower bound.
        low: f32,
        /// Exclusive upper bound, must exceed `low`.
        high: f32,
    },
}

impl Distribution {
    /// Standard normal distribution.
    pub fn standard_normal() -> Self {
        Self::Normal {
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    /// Uniform distribution over `[0, 1)`.
    pub fn unit_uniform() -> Self {
        Self::Uniform { low: 0.0, high: 1.0 }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal { mean, std_dev } => write!(f, "normal(mean={mean}, std={std_dev})"),
            Self::Uniform { low, high } => write!(f, "uniform[{low}, {high})"),
        }
    }
}

/// Capability offered by a numeric library.
///
/// Every fallible call reports [`crate::ShowcaseError::Parse`] for malformed
/// input literals and [`crate::ShowcaseError::ExternalOperation`] for
/// anything that goes wrong inside the library.
pub trait TensorBackend {
    /// Create a tensor from a nested array literal such as `[[1, 2], [3, 4]]`.
    ///
    /// When `shape` is given the flattened values are reshaped to it.
    fn create(&mut self, literal: &str, shape: Option<&[usize]>) -> Result<TensorHandle>;

    /// Create a tensor from flat values in row-major order.
    fn from_values(&mut self, values: Vec<f32>, shape: &[usize]) -> Result<TensorHandle>;

    /// Create a tensor filled from `distribution`. A seed makes it repeatable.
    fn random(
        &mut self,
        distribution: Distribution,
        shape: &[usize],
        seed: Option<u64>,
    ) -> Result<TensorHandle>;

    /// Apply `op` to `inputs`, producing a new tensor.
    fn apply(&mut self, op: &TensorOp, inputs: &[TensorHandle]) -> Result<TensorHandle>;

    /// Flat values of a tensor in row-major order.
    fn values(&self, handle: TensorHandle) -> Result<Vec<f32>>;

    /// Shape of a tensor.
    fn shape(&self, handle: TensorHandle) -> Result<Vec<usize>>;

    /// Printable representation of a tensor.
    fn render(&self, handle: TensorHandle) -> Result<String> {
        Ok(format_tensor(&self.values(handle)?, &self.shape(handle)?))
    }

    /// Current memory accounting.
    fn memory_usage(&self) -> MemoryUsage;

    /// Release a tensor. Releasing an unknown or already released handle is
    /// a no-op.
    fn dispose(&mut self, handle: TensorHandle);
}

/// Render values with the given shape as a nested array, one row per line.
pub fn format_tensor(values: &[f32], shape: &[usize]) -> String {
    let mut body = String::new();
    if shape.is_empty() {
        body.push_str(&format_scalar(values.first().copied().unwrap_or(0.0)));
    } else {
        write_nested(&mut body, values, shape, 5);
    }
    format!("Tensor\n    {body}")
}

fn write_nested(out: &mut String, values: &[f32], shape: &[usize], indent: usize) {
    out.push('[');
    if shape.len() == 1 {
        let row: Vec<String> = values.iter().map(|v| format_scalar(*v)).collect();
        out.push_str(&row.join(", "));
    } else {
        let stride: usize = shape[1..].iter().product();
        for (i, chunk) in values.chunks(stride.max(1)).take(shape[0]).enumerate() {
            if i > 0 {
                out.push_str(",\n");
                out.push_str(&" ".repeat(indent));
            }
            write_nested(out, chunk, &shape[1..], indent + 1);
        }
    }
    out.push(']');
}

fn format_scalar(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{value:.4}")
    }
}
