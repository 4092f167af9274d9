//! JSON snapshot writer for job results.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// Directory the binaries drop their snapshots into.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Writes collections as pretty-printed JSON files under one directory.
///
/// Existing files are overwritten without confirmation; there is no
/// atomic-write guarantee.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create the writer, making the directory if it does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Serialize `value` to `<dir>/<name>`.
    pub fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {}", name))?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!("wrote {}", path.display());
        Ok(path)
    }
}
