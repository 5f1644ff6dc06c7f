//! In-memory output channel.
//!
//! When the merged options name no persistent destination, the engine
//! writes into a process-local virtual filesystem instead of disk. Each
//! assembly owns an independent one; nothing is shared across invocations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::Result;
use crate::sink::OutputSink;

/// In-memory output sink.
///
/// Cloning shares the underlying file map, so the compiler handle and a
/// watch rebuild task observe the same virtual filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently held.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Read-only view of the current contents.
    ///
    /// The snapshot is detached: later writes to the sink do not show
    /// through it.
    pub fn snapshot(&self) -> MemorySnapshot {
        let files = self.files.read();
        let mut view = BTreeMap::new();
        for (path, contents) in files.iter() {
            view.insert(path.clone(), contents.clone());
        }
        MemorySnapshot {
            files: Arc::new(view),
        }
    }

    /// Normalize a written path under the virtual root.
    fn normalize(path: &Path) -> PathBuf {
        Path::new("/").join(path).clean()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let normalized = Self::normalize(path);
        tracing::trace!(file = %normalized.display(), size = contents.len(), "memory write");
        self.files.write().insert(normalized, contents.to_vec());
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }
}

/// Read-only snapshot of the in-memory output, handed to the completion
/// result after a successful run on the in-memory channel.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    files: Arc<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemorySnapshot {
    /// Contents of one file, if present. Paths are rooted at `/`.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.files
            .get(&MemorySink::normalize(path.as_ref()))
            .map(Vec::as_slice)
    }

    /// UTF-8 contents of one file, if present and valid.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.read(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .contains_key(&MemorySink::normalize(path.as_ref()))
    }

    /// All file paths in the snapshot, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
