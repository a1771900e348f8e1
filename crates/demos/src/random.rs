// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Random tensors and their histograms.

use tensor_showcase_core::{
    ChartKind, ChartSpec, Demo, DemoOutput, Distribution, Result, TensorOp, TensorScope,
};
use tracing::debug;

/// Number of histogram bins.
pub const BINS: usize = 10;

/// Samples a tensor from a distribution and charts its histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomDistribution {
    name: &'static str,
    distribution: Distribution,
    shape: Vec<usize>,
    seed: Option<u64>,
}

impl RandomDistribution {
    /// Default sample count.
    pub const SAMPLES: usize = 1000;

    /// Standard normal samples.
    pub fn normal() -> Self {
        Self::new("Random Normal Distribution", Distribution::standard_normal())
    }

    /// Samples uniform over `[0, 1)`.
    pub fn uniform() -> Self {
        Self::new("Random Uniform Distribution", Distribution::unit_uniform())
    }

    fn new(name: &'static str, distribution: Distribution) -> Self {
        Self {
            name,
            distribution,
            shape: vec![Self::SAMPLES],
            seed: None,
        }
    }

    /// Fix the generator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the sampled shape.
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = shape;
        self
    }
}

impl Demo for RandomDistribution {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Sample a random tensor and chart its histogram"
    }

    fn execute(&self, scope: &mut TensorScope<'_>) -> Result<DemoOutput> {
        let samples = scope.random(self.distribution, &self.shape, self.seed)?;
        let mean = scope.unary(TensorOp::Mean, samples)?;
        let centered = scope.binary(TensorOp::Sub, samples, mean)?;
        let squared = scope.unary(TensorOp::Square, centered)?;
        let variance = scope.unary(TensorOp::Mean, squared)?;
        let std_dev = scope.unary(TensorOp::Sqrt, variance)?;
        let min = scope.unary(TensorOp::Min, samples)?;
        let max = scope.unary(TensorOp::Max, samples)?;

        let values = scope.values(samples)?;
        let (lo, hi) = (scope.scalar(min)?, scope.scalar(max)?);
        let (labels, counts) = histogram(&values, lo, hi, BINS);
        debug!(distribution = %self.distribution, samples = values.len(), "sampled random tensor");

        let narrative = format!(
            "Distribution: {}\nShape: {:?}\nSamples: {}\n\
             Mean: {:.4}\nStd dev: {:.4}\nMin: {lo:.4}\nMax: {hi:.4}\nFirst values: {:?}",
            self.distribution,
            self.shape,
            values.len(),
            scope.scalar(mean)?,
            scope.scalar(std_dev)?,
            &values[..values.len().min(5)]
        );

        let chart = ChartSpec::new(ChartKind::Bar, labels).with_series("count", counts);
        Ok(DemoOutput::new(narrative).with_chart(chart))
    }
}

/// Count `values` into `bins` equal-width bins spanning `[lo, hi]`.
///
/// The top edge is inclusive so the maximum lands in the last bin.
pub fn histogram(values: &[f32], lo: f32, hi: f32, bins: usize) -> (Vec<String>, Vec<f64>) {
    let bins = bins.max(1);
    let width = if hi > lo { (hi - lo) / bins as f32 } else { 1.0 };

    let mut counts = vec![0.0f64; bins];
    for &v in values {
        let index = (((v - lo) / width) as usize).min(bins - 1);
        counts[index] += 1.0;
    }

    let labels = (0..bins)
        .map(|i| {
            let start = lo + width * i as f32;
            format!("{start:.2}..{:.2}", start + width)
        })
        .collect();
    (labels, counts)
}
