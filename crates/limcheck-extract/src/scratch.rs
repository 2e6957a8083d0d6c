//! Scratch directory for generated probe sources.
//!
//! Everything the compiler reads or writes lives in one temporary
//! directory that is removed when the guard is dropped, including when
//! the compiler fails and the error is propagated with `?`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use limcheck_core::Result;

/// Name of the generated C file inside the scratch directory
pub const PROBE_SOURCE: &str = "probe.c";

pub struct ProbeScratch {
    dir: TempDir,
}

impl ProbeScratch {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("limcheck-").tempdir()?;
        debug!("Created probe directory {:?}", dir.path());
        Ok(Self { dir })
    }

    /// Write the probe source and return its path
    pub fn write_source(&self, source: &str) -> Result<PathBuf> {
        let path = self.file(PROBE_SOURCE);
        fs::write(&path, source)?;
        Ok(path)
    }

    /// Path of a file inside the scratch directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Read a file the compiler produced; a missing file means the compiler lied about success
    pub fn read_output(&self, name: &str) -> Result<String> {
        let path = self.file(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                limcheck_core::Error::Parse(format!("compiler produced no {}", name)),
            ),
            Err(e) => Err(e.into()),
        }
    }
}
