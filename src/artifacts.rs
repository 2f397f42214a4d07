//! Artifact persistence
//!
//! Writes produced artifacts into the output directory. Saves overwrite
//! silently; there is no append mode. A failed save never touches the
//! in-memory variable store, so the run's artifacts stay intact for a retry.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use codeforge_pipeline::StageId;

/// A persistence operation failed.
#[derive(Error, Debug)]
#[error("failed to write artifact {path}: {source}", path = .path.display())]
pub struct FileIoError {
    /// Path the write was attempted at.
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// File name each stage's artifact is saved under.
#[must_use]
pub const fn artifact_file_name(id: StageId) -> &'static str {
    match id {
        StageId::Generate => "generated_code.py",
        StageId::Review => "code_review.md",
        StageId::Improve => "improved_code.py",
        StageId::TestCases => "test_cases.md",
        StageId::UnitTests => "unit_tests.py",
    }
}

/// Writes artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer rooted at `dir`. The directory is created lazily on
    /// the first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save `content` under `name` in the output directory, overwriting any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Returns [`FileIoError`] when the directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, name: &str, content: &str) -> Result<PathBuf, FileIoError> {
        fs::create_dir_all(&self.dir).map_err(|source| FileIoError {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|source| FileIoError {
            path: path.clone(),
            source,
        })?;

        debug!(
            artifact = name,
            bytes = content.len(),
            blake3 = %blake3::hash(content.as_bytes()).to_hex(),
            "artifact written"
        );

        Ok(path)
    }

    /// The directory this writer saves into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
