pub mod discovery;
pub mod error;
pub mod layer;
pub mod merge;
pub mod options;
pub mod plugin;

// Re-export main types
pub use error::{ConfigError, Result};
pub use layer::{Layer, Source};
pub use merge::{MergeStrategy, merge_layers, strategy_for};
pub use options::{CompilerOptions, OutputOptions};
pub use plugin::PluginSpec;

// Re-export discovery
pub use discovery::{CONFIG_FILE, ConfigDiscovery, MANIFEST_FIELD, MANIFEST_FILE};
