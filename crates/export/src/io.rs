//! Export sinks.
//!
//! A sink receives a finished [`ExportPayload`] and stores it somewhere. The
//! serializer never performs I/O itself.

use crate::error::Result;
use crate::json::SessionExport;
use crate::payload::ExportPayload;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default export directory.
pub const DEFAULT_OUTPUT_DIR: &str = "exports";

/// Destination for export payloads.
#[cfg_attr(test, mockall::automock)]
pub trait ExportSink {
    /// Store `payload`.
    fn save(&self, payload: &ExportPayload) -> Result<()>;
}

/// Writes payloads as files into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl FileSink {
    /// Sink writing into `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the target directory exists.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Write `payload` and return the path written.
    pub fn write(&self, payload: &ExportPayload) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(&payload.filename);
        fs::write(&path, &payload.bytes)?;
        info!(
            path = %path.display(),
            mime = payload.mime,
            bytes = payload.bytes.len(),
            "export written"
        );
        Ok(path)
    }
}

impl ExportSink for FileSink {
    fn save(&self, payload: &ExportPayload) -> Result<()> {
        self.write(payload).map(|_| ())
    }
}

/// Read a JSON session export back from disk.
pub fn read_session_json(path: impl AsRef<Path>) -> Result<SessionExport> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
