//! Output sinks: where the engine's emitted assets land.
//!
//! The persistent sink stages every write to a temp file and commits the
//! whole set with renames on `finish`, so a failed build never leaves a
//! partial output tree behind. All paths are validated against the output
//! root before anything touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use path_clean::PathClean;

use crate::{Error, Result};

/// Write target handed to the engine.
///
/// `write` takes paths relative to the sink root. `finish` commits pending
/// writes; it is called by the compiler handle after a successful run.
pub trait OutputSink: Send + Sync {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn finish(&self) -> Result<()>;
}

pub type SharedSink = Arc<dyn OutputSink>;

/// Persistent output channel writing beneath a real directory.
pub struct DiskSink {
    root: PathBuf,
    staged: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl DiskSink {
    /// Create a sink rooted at the output directory. The directory is
    /// created on the first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into().clean(),
            staged: Mutex::new(Vec::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate an output path against the sink root.
    ///
    /// Rejects null bytes, absolute paths, and any path that resolves
    /// outside the root after `..` components are applied.
    fn validate(&self, filename: &Path) -> Result<PathBuf> {
        let raw = filename.as_os_str();
        if raw.as_encoded_bytes().contains(&0) {
            return Err(Error::InvalidOutputPath(
                "filename contains null byte".to_string(),
            ));
        }
        if filename.is_absolute() {
            return Err(Error::InvalidOutputPath(format!(
                "absolute path '{}' not allowed in output",
                filename.display()
            )));
        }

        let full_path = self.root.join(filename.clean()).clean();
        if !full_path.starts_with(&self.root) {
            return Err(Error::InvalidOutputPath(format!(
                "path '{}' escapes output directory '{}'",
                filename.display(),
                self.root.display()
            )));
        }

        Ok(full_path)
    }

    /// Best-effort removal of staged temp files after a failure.
    fn discard_staged(staged: &mut Vec<(PathBuf, PathBuf)>) {
        for (temp_path, _) in staged.drain(..) {
            if temp_path.exists() {
                if let Err(e) = fs::remove_file(&temp_path) {
                    tracing::warn!(
                        file = %temp_path.display(),
                        error = %e,
                        "failed to clean up staged output file"
                    );
                }
            }
        }
    }
}

impl OutputSink for DiskSink {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let target_path = self.validate(path)?;
        let mut staged = self.staged.lock();

        if let Some(parent) = target_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                Self::discard_staged(&mut staged);
                return Err(Error::WriteFailure(format!(
                    "failed to create directory '{}': {}",
                    parent.display(),
                    e
                )));
            }
        }

        let temp_path = target_path.with_extension("tmp");
        if let Err(e) = fs::write(&temp_path, contents) {
            Self::discard_staged(&mut staged);
            return Err(Error::WriteFailure(format!(
                "failed to write '{}': {}",
                temp_path.display(),
                e
            )));
        }

        staged.push((temp_path, target_path));
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        let mut staged = self.staged.lock();

        // Rename is atomic on most filesystems: readers see either the
        // previous file or the complete new one, never a partial write.
        for i in 0..staged.len() {
            let (temp_path, target_path) = staged[i].clone();
            if let Err(e) = fs::rename(&temp_path, &target_path) {
                Self::discard_staged(&mut staged);
                return Err(Error::WriteFailure(format!(
                    "failed to rename '{}' to '{}': {}",
                    temp_path.display(),
                    target_path.display(),
                    e
                )));
            }
        }

        staged.clear();
        Ok(())
    }
}

impl Drop for DiskSink {
    fn drop(&mut self) {
        let mut staged = self.staged.lock();
        Self::discard_staged(&mut staged);
    }
}
