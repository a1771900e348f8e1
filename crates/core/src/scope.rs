// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scoped acquisition of backend tensors.
//!
//! A [`TensorScope`] borrows the backend for the duration of one demo run.
//! Every tensor created through it is tracked and disposed exactly once,
//! either by [`TensorScope::release_all`] or when the scope is dropped,
//! whichever happens first. Dropping covers the early-return `?` paths of a
//! failing demo.

use crate::backend::{Distribution, MemoryUsage, TensorBackend, TensorHandle, TensorOp};
use crate::Result;
use tracing::trace;

/// Release list tied to a mutable borrow of a [`TensorBackend`].
pub struct TensorScope<'a> {
    backend: &'a mut dyn TensorBackend,
    acquired: Vec<TensorHandle>,
}

impl<'a> TensorScope<'a> {
    /// Open a scope over `backend`.
    pub fn new(backend: &'a mut dyn TensorBackend) -> Self {
        Self {
            backend,
            acquired: Vec::new(),
        }
    }

    fn track(&mut self, handle: TensorHandle) -> TensorHandle {
        self.acquired.push(handle);
        handle
    }

    /// Create a tensor from a nested array literal.
    pub fn create(&mut self, literal: &str, shape: Option<&[usize]>) -> Result<TensorHandle> {
        let handle = self.backend.create(literal, shape)?;
        Ok(self.track(handle))
    }

    /// Create a tensor from flat row-major values.
    pub fn from_values(&mut self, values: Vec<f32>, shape: &[usize]) -> Result<TensorHandle> {
        let handle = self.backend.from_values(values, shape)?;
        Ok(self.track(handle))
    }

    /// Create a random tensor.
    pub fn random(
        &mut self,
        distribution: Distribution,
        shape: &[usize],
        seed: Option<u64>,
    ) -> Result<TensorHandle> {
        let handle = self.backend.random(distribution, shape, seed)?;
        Ok(self.track(handle))
    }

    /// Apply `op` to `inputs`.
    pub fn apply(&mut self, op: &TensorOp, inputs: &[TensorHandle]) -> Result<TensorHandle> {
        let handle = self.backend.apply(op, inputs)?;
        Ok(self.track(handle))
    }

    /// Apply a single-input operation.
    pub fn unary(&mut self, op: TensorOp, input: TensorHandle) -> Result<TensorHandle> {
        self.apply(&op, &[input])
    }

    /// Apply a two-input operation.
    pub fn binary(&mut self, op: TensorOp, lhs: TensorHandle, rhs: TensorHandle) -> Result<TensorHandle> {
        self.apply(&op, &[lhs, rhs])
    }

    /// Flat values of a tensor.
    pub fn values(&self, handle: TensorHandle) -> Result<Vec<f32>> {
        self.backend.values(handle)
    }

    /// Single value of a scalar (or the first element of any tensor).
    pub fn scalar(&self, handle: TensorHandle) -> Result<f32> {
        Ok(self.backend.values(handle)?.first().copied().unwrap_or(0.0))
    }

    /// Shape of a tensor.
    pub fn shape(&self, handle: TensorHandle) -> Result<Vec<usize>> {
        self.backend.shape(handle)
    }

    /// Printable form of a tensor.
    pub fn render(&self, handle: TensorHandle) -> Result<String> {
        self.backend.render(handle)
    }

    /// Backend memory accounting.
    pub fn memory_usage(&self) -> MemoryUsage {
        self.backend.memory_usage()
    }

    /// Release one tensor now. Returns `false` when the handle was not
    /// acquired through this scope or was already released.
    pub fn release(&mut self, handle: TensorHandle) -> bool {
        match self.acquired.iter().position(|h| *h == handle) {
            Some(index) => {
                self.acquired.swap_remove(index);
                self.backend.dispose(handle);
                true
            }
            None => false,
        }
    }

    /// Number of tensors still held by the scope.
    pub fn held(&self) -> usize {
        self.acquired.len()
    }

    /// Release every held tensor, returning how many were released.
    pub fn release_all(&mut self) -> usize {
        let count = self.acquired.len();
        for handle in self.acquired.drain(..) {
            self.backend.dispose(handle);
        }
        if count > 0 {
            trace!(count, "released scoped tensors");
        }
        count
    }
}

impl Drop for TensorScope<'_> {
    fn drop(&mut self) {
        self.release_all();
    }
}
