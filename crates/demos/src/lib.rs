// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Catalogue of tensor demos.
//!
//! Each demo is a fixed sequence of backend operations that narrates what it
//! does and, for some, describes a chart. Demos only acquire tensors through
//! the [`TensorScope`](tensor_showcase_core::TensorScope) they are given, so
//! the orchestrator can release everything afterwards.
//!
//! # Example
//!
//! ```
//! use tensor_showcase_core::DemoOrchestrator;
//! use tensor_showcase_demos::{demo, DemoKind};
//!
//! let mut orchestrator = DemoOrchestrator::with_host_backend();
//! let outcome = orchestrator.run(demo(DemoKind::MatrixOps).as_ref());
//! assert!(outcome.is_success());
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod creation;
pub mod math;
pub mod memory;
pub mod random;
pub mod shape;

pub use creation::{CustomTensor, TensorCreation};
pub use math::{Activations, MathOps, MatrixOps, Reductions};
pub use memory::MemoryManagement;
pub use random::RandomDistribution;
pub use shape::Reshape;

use std::fmt;
use std::str::FromStr;
use tensor_showcase_core::{Demo, ShowcaseError};

/// Identifies a catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoKind {
    /// Scalars, vectors and matrices from literals.
    TensorCreation,
    /// Reshape and transpose.
    Reshape,
    /// Elementwise arithmetic.
    MathOps,
    /// Sum, mean, max and min.
    Reductions,
    /// Matrix product and transpose.
    MatrixOps,
    /// Activation functions.
    Activations,
    /// Normally distributed random tensor.
    RandomNormal,
    /// Uniformly distributed random tensor.
    RandomUniform,
    /// Explicit release and memory accounting.
    MemoryManagement,
    /// User supplied literal.
    CustomTensor,
}

impl DemoKind {
    /// Every catalogue entry, in presentation order.
    pub const ALL: [DemoKind; 10] = [
        Self::TensorCreation,
        Self::Reshape,
        Self::MathOps,
        Self::Reductions,
        Self::MatrixOps,
        Self::Activations,
        Self::RandomNormal,
        Self::RandomUniform,
        Self::MemoryManagement,
        Self::CustomTensor,
    ];

    /// Command-line slug.
    pub fn slug(self) -> &'static str {
        match self {
            Self::TensorCreation => "tensor-creation",
            Self::Reshape => "reshape",
            Self::MathOps => "math-ops",
            Self::Reductions => "reductions",
            Self::MatrixOps => "matrix-ops",
            Self::Activations => "activations",
            Self::RandomNormal => "random-normal",
            Self::RandomUniform => "random-uniform",
            Self::MemoryManagement => "memory-management",
            Self::CustomTensor => "custom-tensor",
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DemoKind {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| ShowcaseError::invalid_argument(format!("unknown demo '{s}'")))
    }
}

/// Build the demo for `kind` with its default parameters.
///
/// [`DemoKind::CustomTensor`] uses [`CustomTensor::DEFAULT_LITERAL`]; build a
/// [`CustomTensor`] directly to supply other text.
pub fn demo(kind: DemoKind) -> Box<dyn Demo> {
    match kind {
        DemoKind::TensorCreation => Box::new(TensorCreation),
        DemoKind::Reshape => Box::new(Reshape),
        DemoKind::MathOps => Box::new(MathOps),
        DemoKind::Reductions => Box::new(Reductions),
        DemoKind::MatrixOps => Box::new(MatrixOps),
        DemoKind::Activations => Box::new(Activations),
        DemoKind::RandomNormal => Box::new(RandomDistribution::normal()),
        DemoKind::RandomUniform => Box::new(RandomDistribution::uniform()),
        DemoKind::MemoryManagement => Box::new(MemoryManagement),
        DemoKind::CustomTensor => Box::new(CustomTensor::default()),
    }
}

/// Every catalogue demo with default parameters.
pub fn catalogue() -> Vec<Box<dyn Demo>> {
    DemoKind::ALL.into_iter().map(demo).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_round_trip() {
        for kind in DemoKind::ALL {
            assert_eq!(kind.to_string().parse::<DemoKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_underscores() {
        assert_eq!("Matrix_Ops".parse::<DemoKind>().unwrap(), DemoKind::MatrixOps);
        assert_eq!(" reshape ".parse::<DemoKind>().unwrap(), DemoKind::Reshape);
    }

    #[test]
    fn test_unknown_demo_is_invalid_argument() {
        let err = "convolution".parse::<DemoKind>().unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));
        assert!(err.to_string().contains("convolution"));
    }

    #[test]
    fn test_catalogue_names_are_unique() {
        let demos = catalogue();
        let mut names: Vec<&str> = demos.iter().map(|d| d.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DemoKind::ALL.len());
    }
}
