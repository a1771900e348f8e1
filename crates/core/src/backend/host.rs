// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process reference backend.
//!
//! Tensors are plain row-major `f32` buffers keyed by handle id. Memory is
//! accounted at four bytes per element, the way a float32 library reports it.

use super::{parse_tensor_literal, Distribution, MemoryUsage, TensorBackend, TensorHandle, TensorOp};
use crate::{Result, ShowcaseError};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use std::collections::HashMap;
use tracing::trace;

const BYTES_PER_ELEMENT: u64 = 4;

#[derive(Debug, Clone)]
struct HostTensor {
    values: Vec<f32>,
    shape: Vec<usize>,
}

impl HostTensor {
    fn size_bytes(&self) -> u64 {
        self.values.len() as u64 * BYTES_PER_ELEMENT
    }
}

/// Backend keeping every tensor in process memory.
#[derive(Debug)]
pub struct HostBackend {
    tensors: HashMap<u64, HostTensor>,
    next_id: u64,
    bytes_in_use: u64,
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            tensors: HashMap::new(),
            next_id: 1,
            bytes_in_use: 0,
        }
    }

    /// Whether `handle` still refers to a live tensor.
    pub fn is_live(&self, handle: TensorHandle) -> bool {
        self.tensors.contains_key(&handle.id())
    }

    fn insert(&mut self, values: Vec<f32>, shape: Vec<usize>) -> TensorHandle {
        let tensor = HostTensor { values, shape };
        self.bytes_in_use += tensor.size_bytes();
        let handle = TensorHandle::new(self.next_id);
        self.next_id += 1;
        trace!(%handle, shape = ?tensor.shape, "allocated tensor");
        self.tensors.insert(handle.id(), tensor);
        handle
    }

    fn get(&self, handle: TensorHandle) -> Result<&HostTensor> {
        self.tensors
            .get(&handle.id())
            .ok_or_else(|| ShowcaseError::external(format!("{handle} has been disposed")))
    }

    fn compute(&self, op: &TensorOp, inputs: &[TensorHandle]) -> Result<HostTensor> {
        if inputs.len() != op.arity() {
            return Err(ShowcaseError::external(format!(
                "{} expects {} input(s), got {}",
                op.name(),
                op.arity(),
                inputs.len()
            )));
        }
        let a = self.get(inputs[0])?;

        match op {
            TensorOp::Add => elementwise(op, a, self.get(inputs[1])?, |x, y| x + y),
            TensorOp::Sub => elementwise(op, a, self.get(inputs[1])?, |x, y| x - y),
            TensorOp::Mul => elementwise(op, a, self.get(inputs[1])?, |x, y| x * y),
            TensorOp::Div => elementwise(op, a, self.get(inputs[1])?, |x, y| x / y),
            TensorOp::MatMul => matmul(a, self.get(inputs[1])?),
            TensorOp::Transpose => transpose(a),
            TensorOp::Reshape(shape) => {
                let size = checked_size(shape).ok_or_else(|| {
                    ShowcaseError::external(format!("reshape target {shape:?} is too large"))
                })?;
                if size != a.values.len() {
                    return Err(ShowcaseError::external(format!(
                        "cannot reshape tensor of {} elements to {shape:?}",
                        a.values.len()
                    )));
                }
                Ok(HostTensor {
                    values: a.values.clone(),
                    shape: shape.clone(),
                })
            }
            TensorOp::Relu => Ok(map(a, |x| x.max(0.0))),
            TensorOp::Sigmoid => Ok(map(a, |x| 1.0 / (1.0 + (-x).exp()))),
            TensorOp::Tanh => Ok(map(a, f32::tanh)),
            TensorOp::Square => Ok(map(a, |x| x * x)),
            TensorOp::Sqrt => Ok(map(a, f32::sqrt)),
            TensorOp::Exp => Ok(map(a, f32::exp)),
            TensorOp::Abs => Ok(map(a, f32::abs)),
            TensorOp::Sum => Ok(scalar(a.values.iter().sum())),
            TensorOp::Mean => {
                if a.values.is_empty() {
                    return Err(empty_reduction(op));
                }
                Ok(scalar(a.values.iter().sum::<f32>() / a.values.len() as f32))
            }
            TensorOp::Max => a
                .values
                .iter()
                .copied()
                .reduce(f32::max)
                .map(scalar)
                .ok_or_else(|| empty_reduction(op)),
            TensorOp::Min => a
                .values
                .iter()
                .copied()
                .reduce(f32::min)
                .map(scalar)
                .ok_or_else(|| empty_reduction(op)),
            TensorOp::Softmax => softmax(a),
        }
    }
}

impl TensorBackend for HostBackend {
    fn create(&mut self, literal: &str, shape: Option<&[usize]>) -> Result<TensorHandle> {
        let (values, inferred) = parse_tensor_literal(literal)?;
        let shape = match shape {
            Some(shape) => {
                let size = checked_size(shape).ok_or_else(|| oversized(shape))?;
                if size != values.len() {
                    return Err(ShowcaseError::parse(format!(
                        "shape {shape:?} needs {size} values but the literal has {}",
                        values.len()
                    )));
                }
                shape.to_vec()
            }
            None => inferred,
        };
        Ok(self.insert(values, shape))
    }

    fn from_values(&mut self, values: Vec<f32>, shape: &[usize]) -> Result<TensorHandle> {
        let size = checked_size(shape).ok_or_else(|| oversized(shape))?;
        if size != values.len() {
            return Err(ShowcaseError::parse(format!(
                "shape {shape:?} needs {size} values, got {}",
                values.len()
            )));
        }
        Ok(self.insert(values, shape.to_vec()))
    }

    fn random(
        &mut self,
        distribution: Distribution,
        shape: &[usize],
        seed: Option<u64>,
    ) -> Result<TensorHandle> {
        let size = checked_size(shape).ok_or_else(|| {
            ShowcaseError::invalid_argument(format!("random shape {shape:?} is too large"))
        })?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let values: Vec<f32> = match distribution {
            Distribution::Normal { mean, std_dev } => {
                let normal = Normal::new(mean, std_dev).map_err(|e| {
                    ShowcaseError::invalid_argument(format!(
                        "invalid normal distribution (mean={mean}, std={std_dev}): {e}"
                    ))
                })?;
                (&mut rng).sample_iter(normal).take(size).collect()
            }
            Distribution::Uniform { low, high } => {
                // Uniform::new panics on these.
                if !(low < high && (high - low).is_finite()) {
                    return Err(ShowcaseError::invalid_argument(format!(
                        "uniform bounds must be finite with low < high, got [{low}, {high})"
                    )));
                }
                (&mut rng)
                    .sample_iter(Uniform::new(low, high))
                    .take(size)
                    .collect()
            }
        };
        Ok(self.insert(values, shape.to_vec()))
    }

    fn apply(&mut self, op: &TensorOp, inputs: &[TensorHandle]) -> Result<TensorHandle> {
        let out = self.compute(op, inputs)?;
        Ok(self.insert(out.values, out.shape))
    }

    fn values(&self, handle: TensorHandle) -> Result<Vec<f32>> {
        Ok(self.get(handle)?.values.clone())
    }

    fn shape(&self, handle: TensorHandle) -> Result<Vec<usize>> {
        Ok(self.get(handle)?.shape.clone())
    }

    fn memory_usage(&self) -> MemoryUsage {
        MemoryUsage {
            bytes_in_use: self.bytes_in_use,
            num_tensors: self.tensors.len(),
        }
    }

    fn dispose(&mut self, handle: TensorHandle) {
        if let Some(tensor) = self.tensors.remove(&handle.id()) {
            self.bytes_in_use -= tensor.size_bytes();
            trace!(%handle, "disposed tensor");
        }
    }
}

/// Element count of `shape`, or `None` when it overflows `usize`.
fn checked_size(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

fn oversized(shape: &[usize]) -> ShowcaseError {
    ShowcaseError::parse(format!("shape {shape:?} has too many elements"))
}

fn scalar(value: f32) -> HostTensor {
    HostTensor {
        values: vec![value],
        shape: Vec::new(),
    }
}

fn empty_reduction(op: &TensorOp) -> ShowcaseError {
    ShowcaseError::external(format!("{} of an empty tensor is undefined", op.name()))
}

fn map(a: &HostTensor, f: impl Fn(f32) -> f32) -> HostTensor {
    HostTensor {
        values: a.values.iter().map(|x| f(*x)).collect(),
        shape: a.shape.clone(),
    }
}

/// Elementwise binary op. Equal shapes pair up; a single-element operand
/// broadcasts against the other.
fn elementwise(
    op: &TensorOp,
    a: &HostTensor,
    b: &HostTensor,
    f: impl Fn(f32, f32) -> f32,
) -> Result<HostTensor> {
    if a.shape == b.shape {
        let values = a.values.iter().zip(&b.values).map(|(x, y)| f(*x, *y)).collect();
        return Ok(HostTensor {
            values,
            shape: a.shape.clone(),
        });
    }
    if b.values.len() == 1 {
        let y = b.values[0];
        return Ok(map(a, |x| f(x, y)));
    }
    if a.values.len() == 1 {
        let x = a.values[0];
        return Ok(map(b, |y| f(x, y)));
    }
    Err(ShowcaseError::external(format!(
        "{}: incompatible shapes {:?} and {:?}",
        op.name(),
        a.shape,
        b.shape
    )))
}

fn matmul(a: &HostTensor, b: &HostTensor) -> Result<HostTensor> {
    let (&[m, k], &[k2, n]) = (a.shape.as_slice(), b.shape.as_slice()) else {
        return Err(ShowcaseError::external(format!(
            "matMul expects rank-2 inputs, got {:?} and {:?}",
            a.shape, b.shape
        )));
    };
    if k != k2 {
        return Err(ShowcaseError::external(format!(
            "matMul: inner dimensions differ ({k} vs {k2})"
        )));
    }

    let mut values = vec![0.0f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let lhs = a.values[i * k + p];
            for j in 0..n {
                values[i * n + j] += lhs * b.values[p * n + j];
            }
        }
    }
    Ok(HostTensor {
        values,
        shape: vec![m, n],
    })
}

fn transpose(a: &HostTensor) -> Result<HostTensor> {
    match a.shape.as_slice() {
        &[rows, cols] => {
            let mut values = Vec::with_capacity(a.values.len());
            for c in 0..cols {
                for r in 0..rows {
                    values.push(a.values[r * cols + c]);
                }
            }
            Ok(HostTensor {
                values,
                shape: vec![cols, rows],
            })
        }
        &[] | &[_] => Ok(a.clone()),
        other => Err(ShowcaseError::external(format!(
            "transpose supports rank <= 2, got shape {other:?}"
        ))),
    }
}

fn softmax(a: &HostTensor) -> Result<HostTensor> {
    let axis = a.shape.last().copied().unwrap_or(1);
    if axis == 0 {
        return Err(ShowcaseError::external("softmax over an empty axis"));
    }

    let mut values = Vec::with_capacity(a.values.len());
    for row in a.values.chunks(axis) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = row.iter().map(|x| (x - max).exp()).collect();
        let total: f32 = exps.iter().sum();
        values.extend(exps.into_iter().map(|e| e / total));
    }
    Ok(HostTensor {
        values,
        shape: a.shape.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(backend: &mut HostBackend, literal: &str) -> TensorHandle {
        backend.create(literal, None).unwrap()
    }

    #[test]
    fn test_create_accounts_memory() {
        let mut backend = HostBackend::new();
        let t = tensor(&mut backend, "[[1, 2], [3, 4]]");
        assert_eq!(backend.shape(t).unwrap(), vec![2, 2]);
        assert_eq!(
            backend.memory_usage(),
            MemoryUsage {
                bytes_in_use: 16,
                num_tensors: 1
            }
        );
    }

    #[test]
    fn test_create_with_explicit_shape() {
        let mut backend = HostBackend::new();
        let t = backend.create("[1, 2, 3, 4, 5, 6]", Some(&[2, 3])).unwrap();
        assert_eq!(backend.shape(t).unwrap(), vec![2, 3]);

        let err = backend.create("[1, 2, 3]", Some(&[2, 2])).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut backend = HostBackend::new();
        let t = tensor(&mut backend, "[1, 2, 3]");
        backend.dispose(t);
        backend.dispose(t);
        assert_eq!(backend.memory_usage(), MemoryUsage::default());
        assert!(!backend.is_live(t));
        assert!(backend.values(t).is_err());
    }

    #[test]
    fn test_elementwise_and_broadcast() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[1, 2, 3]");
        let b = tensor(&mut backend, "[10, 20, 30]");
        let two = tensor(&mut backend, "2");

        let sum = backend.apply(&TensorOp::Add, &[a, b]).unwrap();
        assert_eq!(backend.values(sum).unwrap(), vec![11.0, 22.0, 33.0]);

        let scaled = backend.apply(&TensorOp::Mul, &[a, two]).unwrap();
        assert_eq!(backend.values(scaled).unwrap(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_incompatible_shapes_fail_externally() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[1, 2, 3]");
        let b = tensor(&mut backend, "[1, 2]");
        let err = backend.apply(&TensorOp::Add, &[a, b]).unwrap_err();
        assert!(matches!(err, ShowcaseError::ExternalOperation(_)));
    }

    #[test]
    fn test_matmul_and_transpose() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[[1, 2], [3, 4]]");
        let b = tensor(&mut backend, "[[5, 6], [7, 8]]");
        let c = backend.apply(&TensorOp::MatMul, &[a, b]).unwrap();
        assert_eq!(backend.values(c).unwrap(), vec![19.0, 22.0, 43.0, 50.0]);

        let m = tensor(&mut backend, "[[1, 2, 3], [4, 5, 6]]");
        let t = backend.apply(&TensorOp::Transpose, &[m]).unwrap();
        assert_eq!(backend.shape(t).unwrap(), vec![3, 2]);
        assert_eq!(backend.values(t).unwrap(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_reshape_checks_size() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[1, 2, 3, 4, 5, 6]");
        let r = backend.apply(&TensorOp::Reshape(vec![3, 2]), &[a]).unwrap();
        assert_eq!(backend.shape(r).unwrap(), vec![3, 2]);
        assert!(backend.apply(&TensorOp::Reshape(vec![4, 2]), &[a]).is_err());
    }

    #[test]
    fn test_reductions() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[[1, 5], [3, -2]]");
        let read = |b: &HostBackend, h| b.values(h).unwrap()[0];

        let sum = backend.apply(&TensorOp::Sum, &[a]).unwrap();
        let mean = backend.apply(&TensorOp::Mean, &[a]).unwrap();
        let max = backend.apply(&TensorOp::Max, &[a]).unwrap();
        let min = backend.apply(&TensorOp::Min, &[a]).unwrap();
        assert_eq!(read(&backend, sum), 7.0);
        assert_eq!(read(&backend, mean), 1.75);
        assert_eq!(read(&backend, max), 5.0);
        assert_eq!(read(&backend, min), -2.0);
        assert!(backend.shape(sum).unwrap().is_empty());

        let empty = tensor(&mut backend, "[]");
        assert!(backend.apply(&TensorOp::Max, &[empty]).is_err());
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[[1, 2, 3], [0, 0, 0]]");
        let s = backend.apply(&TensorOp::Softmax, &[a]).unwrap();
        let values = backend.values(s).unwrap();
        for row in values.chunks(3) {
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
        assert!((values[3] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_random_is_repeatable() {
        let mut backend = HostBackend::new();
        let a = backend
            .random(Distribution::standard_normal(), &[64], Some(7))
            .unwrap();
        let b = backend
            .random(Distribution::standard_normal(), &[64], Some(7))
            .unwrap();
        assert_eq!(backend.values(a).unwrap(), backend.values(b).unwrap());
    }

    #[test]
    fn test_uniform_stays_in_bounds() {
        let mut backend = HostBackend::new();
        let u = backend
            .random(Distribution::Uniform { low: -1.0, high: 1.0 }, &[500], Some(1))
            .unwrap();
        assert!(backend
            .values(u)
            .unwrap()
            .iter()
            .all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn test_random_rejects_bad_parameters() {
        let mut backend = HostBackend::new();
        let err = backend
            .random(Distribution::Uniform { low: 1.0, high: 1.0 }, &[4], None)
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));
        let err = backend
            .random(
                Distribution::Normal {
                    mean: 0.0,
                    std_dev: -1.0,
                },
                &[4],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));
        let err = backend
            .random(
                Distribution::Uniform {
                    low: 0.0,
                    high: f32::INFINITY,
                },
                &[4],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));
        assert_eq!(backend.memory_usage().num_tensors, 0);
    }

    #[test]
    fn test_overflowing_shapes_are_errors() {
        let mut backend = HostBackend::new();
        let huge = [usize::MAX, 2];

        let err = backend.create("[1, 2]", Some(&huge)).unwrap_err();
        assert!(err.is_parse());

        let err = backend.from_values(vec![1.0, 2.0], &huge).unwrap_err();
        assert!(err.is_parse());

        let err = backend
            .random(Distribution::standard_normal(), &huge, Some(1))
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));

        let t = tensor(&mut backend, "[1, 2]");
        let err = backend
            .apply(&TensorOp::Reshape(huge.to_vec()), &[t])
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::ExternalOperation(_)));
        assert_eq!(backend.memory_usage().num_tensors, 1);
    }

    #[test]
    fn test_normal_sample_statistics() {
        let mut backend = HostBackend::new();
        let t = backend
            .random(
                Distribution::Normal {
                    mean: 5.0,
                    std_dev: 2.0,
                },
                &[4000],
                Some(3),
            )
            .unwrap();
        let values = backend.values(t).unwrap();
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
        assert!((mean - 5.0).abs() < 0.2, "mean {mean}");
        assert!((variance.sqrt() - 2.0).abs() < 0.2, "std {}", variance.sqrt());
    }

    #[test]
    fn test_arity_is_checked() {
        let mut backend = HostBackend::new();
        let a = tensor(&mut backend, "[1]");
        assert!(backend.apply(&TensorOp::Add, &[a]).is_err());
    }
}
