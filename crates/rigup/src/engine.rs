//! Seam toward the external compile engine.
//!
//! The engine owns compilation end to end: module graph, loaders, codegen,
//! scheduling. This crate only assembles its options, hands it a write
//! target, and decorates its completion result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rigup_config::CompilerOptions;

use crate::Result;
use crate::plugins::SharedPlugin;
use crate::sink::SharedSink;

/// Context handed to the engine for a single build.
///
/// The sink is the engine's only write path; the engine never chooses
/// between persistent and in-memory output itself.
pub struct BuildContext {
    output_root: PathBuf,
    sink: SharedSink,
}

impl BuildContext {
    pub(crate) fn new(output_root: PathBuf, sink: SharedSink) -> Self {
        Self { output_root, sink }
    }

    /// Root path the emitted assets conceptually live under. `/` for the
    /// in-memory channel.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Emit one asset at a path relative to the output root.
    pub fn emit(&self, filename: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
        self.sink.write(filename.as_ref(), contents)
    }
}

/// One emitted asset, as reported in the build stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    pub filename: String,
    pub size: usize,
}

/// Result of one engine run.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Assets the engine emitted, in emission order.
    pub assets: Vec<EmittedAsset>,

    /// Wall-clock duration of the run.
    pub duration: Duration,

    /// Non-fatal diagnostics collected during the run.
    pub warnings: Vec<String>,
}

impl BuildStats {
    /// Total emitted size in bytes.
    pub fn total_size(&self) -> usize {
        self.assets.iter().map(|a| a.size).sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// The external compile engine.
///
/// `run` is a single invocation that completes once. Its scheduling,
/// concurrency and cancellation semantics belong to the engine; errors it
/// reports pass through the façade unchanged.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(&self, ctx: &BuildContext) -> Result<BuildStats>;
}

/// Turns merged options and resolved plugins into a runnable engine.
///
/// The options value received here is a clone; mutating it cannot corrupt
/// the view held by the caller's compiler handle.
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        options: CompilerOptions,
        plugins: Vec<SharedPlugin>,
    ) -> Result<Arc<dyn Engine>>;
}
