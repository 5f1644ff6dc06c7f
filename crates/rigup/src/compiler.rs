//! The assembled compiler handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rigup_config::CompilerOptions;

use crate::Result;
use crate::engine::{BuildContext, BuildStats, Engine};
use crate::memfs::{MemorySink, MemorySnapshot};
use crate::sink::{DiskSink, SharedSink};
use crate::watch::WatchSession;

/// Root path assets conceptually live under on the in-memory channel.
const MEMORY_OUTPUT_ROOT: &str = "/";

/// The output channel selected at assembly time.
#[derive(Clone)]
pub(crate) enum OutputChannel {
    /// Engine writes beneath a real directory.
    Persistent { root: PathBuf, sink: Arc<DiskSink> },
    /// Engine writes into a per-assembly virtual filesystem.
    Memory { sink: MemorySink },
}

impl OutputChannel {
    fn sink(&self) -> SharedSink {
        match self {
            OutputChannel::Persistent { sink, .. } => sink.clone(),
            OutputChannel::Memory { sink } => Arc::new(sink.clone()),
        }
    }

    fn output_root(&self) -> &Path {
        match self {
            OutputChannel::Persistent { root, .. } => root,
            OutputChannel::Memory { .. } => Path::new(MEMORY_OUTPUT_ROOT),
        }
    }

    fn snapshot(&self) -> Option<MemorySnapshot> {
        match self {
            OutputChannel::Persistent { .. } => None,
            OutputChannel::Memory { sink } => Some(sink.snapshot()),
        }
    }
}

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct Build {
    /// Stats the engine reported, passed through unchanged.
    pub stats: BuildStats,

    /// Read-only view of the in-memory output. `None` on the persistent
    /// channel.
    pub memory: Option<MemorySnapshot>,
}

/// The compiler instance returned by [`Assembler::assemble`].
///
/// Owned by the caller. `run` and `watch` delegate to the external engine;
/// the handle only decorates their completion results with the in-memory
/// output view when that channel is active.
///
/// [`Assembler::assemble`]: crate::assembler::Assembler::assemble
#[derive(Clone)]
pub struct Compiler {
    engine: Arc<dyn Engine>,
    options: CompilerOptions,
    channel: OutputChannel,
}

impl Compiler {
    pub(crate) fn new(
        engine: Arc<dyn Engine>,
        options: CompilerOptions,
        channel: OutputChannel,
    ) -> Self {
        Self {
            engine,
            options,
            channel,
        }
    }

    /// The merged options this handle was assembled with. Engine-side
    /// mutation never shows through here.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Root the emitted assets land under: the persistent output directory,
    /// or `/` on the in-memory channel.
    pub fn output_root(&self) -> &Path {
        self.channel.output_root()
    }

    pub fn writes_to_memory(&self) -> bool {
        matches!(self.channel, OutputChannel::Memory { .. })
    }

    /// Run the engine once.
    ///
    /// Engine errors propagate unchanged. On success the build carries the
    /// engine's stats and, on the in-memory channel, a snapshot of the
    /// captured output.
    pub async fn run(&self) -> Result<Build> {
        let ctx = BuildContext::new(self.channel.output_root().to_path_buf(), self.channel.sink());

        let stats = self.engine.run(&ctx).await?;
        self.channel.sink().finish()?;

        tracing::debug!(
            assets = stats.assets.len(),
            total_size = stats.total_size(),
            memory = self.writes_to_memory(),
            "build completed"
        );

        Ok(Build {
            stats,
            memory: self.channel.snapshot(),
        })
    }

    /// Rebuild on every change under the project base directory until the
    /// returned session is dropped.
    ///
    /// An initial build is delivered first; afterwards each detected change
    /// (debounced by `debounce`) triggers exactly one rebuild, and each
    /// rebuild outcome is delivered exactly once, in order. Must be called
    /// within a Tokio runtime.
    pub fn watch(&self, debounce: Duration) -> Result<WatchSession> {
        crate::watch::spawn(self.clone(), debounce)
    }
}
