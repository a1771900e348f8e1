// Copyright 2025 Tensor Showcase Contributors
// SPDX-License-Identifier: Apache-2.0

//! Session-scoped log of human-readable demo output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One titled block of demo output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Block title (the demo name, or `"Error"`).
    pub title: String,
    /// Rendered output.
    pub content: String,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// Ordered, unbounded list of [`ResultEntry`]s.
///
/// Insertion order is display order. Entries are never removed individually.
#[derive(Debug, Clone, Default)]
pub struct ResultLog {
    entries: Vec<ResultEntry>,
}

impl ResultLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current time.
    pub fn append(&mut self, title: impl Into<String>, content: impl Into<String>) -> &ResultEntry {
        self.entries.push(ResultEntry {
            title: title.into(),
            content: content.into(),
            timestamp: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Render every entry as one text block.
    ///
    /// Each entry becomes a `=== title ===` line, its content, and a blank
    /// separator line. The output depends only on the entries.
    pub fn format_all(&self) -> String {
        self.to_string()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    /// Most recently appended entry.
    pub fn last(&self) -> Option<&ResultEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ResultLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "=== {} ===", entry.title)?;
            writeln!(f, "{}", entry.content)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
