// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared by every showcase component.

use thiserror::Error;

/// Errors raised by the tensor backend, the benchmark runner and
/// configuration loading.
///
/// The metric recorder and the result log are append-only sinks and never
/// produce one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShowcaseError {
    /// Malformed tensor input (bad literal, shape that does not fit the data).
    #[error("Parse error: {0}")]
    Parse(String),

    /// A caller supplied an argument outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure raised by the numeric backend while executing an operation.
    #[error("{0}")]
    ExternalOperation(String),

    /// Configuration could not be loaded or deserialized.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShowcaseError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an external operation failure.
    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalOperation(msg.into())
    }

    /// Whether this error was caused by malformed user input.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<::config::ConfigError> for ShowcaseError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for showcase operations.
pub type Result<T> = std::result::Result<T, ShowcaseError>;
