// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Layered configuration.
//!
//! Values come from built-in defaults, then an optional TOML file
//! (`showcase.toml` in the working directory unless a path is given), then
//! environment variables such as `SHOWCASE__MONITOR__INTERVAL_MS=500`.

use crate::recorder::CAPACITY;
use crate::monitor::DEFAULT_MEMORY_BUDGET_BYTES;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SHOWCASE";

/// Default configuration file stem, resolved in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "showcase";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    /// Metric recorder settings.
    pub metrics: MetricsConfig,
    /// Performance monitor settings.
    pub monitor: MonitorConfig,
    /// Export settings.
    pub export: ExportConfig,
    /// Benchmark settings.
    pub benchmark: BenchmarkConfig,
}

/// Metric recorder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Number of metrics retained.
    pub capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { capacity: CAPACITY }
    }
}

/// Performance monitor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sampling interval in milliseconds.
    pub interval_ms: u64,
    /// Budget the memory percentage is computed against.
    pub memory_budget_bytes: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
        }
    }
}

impl MonitorConfig {
    /// Sampling interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    pub output_dir: PathBuf,
    /// Report title.
    pub title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exports"),
            title: "TensorFlow Operations Results".to_string(),
        }
    }
}

/// Benchmark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Default iteration count.
    pub iterations: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self { iterations: 10 }
    }
}

impl ShowcaseConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = ::config::Config::builder()
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ShowcaseConfig::default();
        assert_eq!(config.metrics.capacity, 100);
        assert_eq!(config.monitor.interval(), Duration::from_secs(1));
        assert_eq!(config.monitor.memory_budget_bytes, 100 * 1024 * 1024);
        assert_eq!(config.benchmark.iterations, 10);
        assert_eq!(config.export.output_dir, PathBuf::from("exports"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[metrics]\ncapacity = 25\n\n[monitor]\ninterval_ms = 250").unwrap();

        let config = ShowcaseConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.metrics.capacity, 25);
        assert_eq!(config.monitor.interval_ms, 250);
        assert_eq!(config.monitor.memory_budget_bytes, DEFAULT_MEMORY_BUDGET_BYTES);
        assert_eq!(config.export.title, "TensorFlow Operations Results");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ShowcaseConfig::load(Some(Path::new("/nonexistent/showcase.toml"))).unwrap_err();
        assert!(matches!(err, crate::ShowcaseError::Config(_)));
    }
}
