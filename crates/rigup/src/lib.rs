//! # rigup
//!
//! Configuration assembler for an external compile engine.
//!
//! rigup layers compiler options from four sources (built-in defaults, the
//! project manifest, the project config file, explicit caller options),
//! resolves declarative plugin descriptors, and returns a compiler handle
//! wired to the engine the caller provides. When the merged options name no
//! persistent output destination, emitted assets are captured in a
//! per-assembly in-memory filesystem and handed back with each build.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rigup::{Assembler, Overrides};
//! # fn engine_factory() -> std::sync::Arc<dyn rigup::EngineFactory> { unimplemented!() }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let compiler = Assembler::new("./my-project")
//!     .overrides(Overrides::new().entry(["src/index.js"]))
//!     .engine(engine_factory())
//!     .assemble()?;
//!
//! let build = compiler.run().await?;
//! if let Some(memory) = &build.memory {
//!     for path in memory.paths() {
//!         println!("captured: {}", path.display());
//!     }
//! }
//! # Ok(()) }
//! ```
//!
//! ## Watch mode
//!
//! ```no_run
//! # use rigup::{Assembler, Overrides};
//! # fn engine_factory() -> std::sync::Arc<dyn rigup::EngineFactory> { unimplemented!() }
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let compiler = Assembler::new(".").engine(engine_factory()).assemble()?;
//! let mut session = compiler.watch(std::time::Duration::from_millis(200))?;
//! while let Some(outcome) = session.next().await {
//!     match outcome {
//!         Ok(build) => println!("rebuilt {} assets", build.stats.assets.len()),
//!         Err(err) => eprintln!("build failed: {}", err),
//!     }
//! }
//! # Ok(()) }
//! ```

pub mod assembler;
pub mod compiler;
pub mod engine;
pub mod memfs;
pub mod plugins;
pub mod sink;
pub mod watch;

// Re-export the attribute macro engine implementors need
pub use async_trait::async_trait;

// Re-export configuration types for library users
pub use rigup_config::{
    CompilerOptions, ConfigDiscovery, ConfigError, Layer, MergeStrategy, OutputOptions,
    PluginSpec, Source, merge_layers, strategy_for,
};

// Re-export the façade surface
pub use assembler::{Assembler, OutputOverrides, Overrides};
pub use compiler::{Build, Compiler};
pub use engine::{BuildContext, BuildStats, EmittedAsset, Engine, EngineFactory};
pub use memfs::{MemorySink, MemorySnapshot};
pub use plugins::{Plugin, PluginEntry, PluginFactory, SharedPlugin};
pub use sink::{DiskSink, OutputSink, SharedSink};
pub use watch::WatchSession;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "logging")]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

use std::path::PathBuf;

/// Error types for rigup operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or merging failed.
    #[error("configuration error: {0}")]
    Config(#[from] rigup_config::ConfigError),

    /// The merged options did not fit the expected shape.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// No constructor registered for a plugin descriptor key.
    #[error("unknown plugin kind: {0}")]
    UnknownPlugin(String),

    /// A plugin constructor rejected its descriptor.
    #[error("plugin construction failed for '{name}': {message}")]
    PluginConstruction { name: String, message: String },

    /// Assembly was attempted without an engine factory.
    #[error("no engine factory configured")]
    MissingEngineFactory,

    /// Error reported by the external engine, passed through unchanged.
    #[error("engine error: {0}")]
    Engine(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("write failure: {0}")]
    WriteFailure(String),

    /// Watch mode was requested for a nonexistent base directory.
    #[error("watch root not found: {0}")]
    WatchRootNotFound(PathBuf),

    /// Filesystem watcher error.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rigup operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::InvalidOptions(_) => "INVALID_OPTIONS",
            Error::UnknownPlugin(_) => "UNKNOWN_PLUGIN",
            Error::PluginConstruction { .. } => "PLUGIN_CONSTRUCTION",
            Error::MissingEngineFactory => "MISSING_ENGINE_FACTORY",
            Error::Engine(_) => "ENGINE_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::WatchRootNotFound(_) => "WATCH_ROOT_NOT_FOUND",
            Error::Watch(_) => "WATCH_ERROR",
            Error::Io(_) => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Config(_) => Some(Box::new(
                "Check the project's package.json rigup field and rigup.toml for syntax errors.",
            )),
            Error::UnknownPlugin(name) => Some(Box::new(format!(
                "No constructor is registered for '{}'. Register one on the PluginFactory \
                 passed to the assembler.",
                name
            ))),
            Error::MissingEngineFactory => Some(Box::new(
                "Call Assembler::engine(...) with an engine factory before assemble().",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Paths must stay within the output directory.",
                path
            ))),
            Error::WriteFailure(_) => Some(Box::new(
                "Failed to write output. Check disk space and permissions.",
            )),
            _ => None,
        }
    }
}
