//! Core compiler option types shared across rigup crates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::plugin::PluginSpec;

/// Output destination options.
///
/// This sub-mapping is merged key-by-key across configuration layers, so a
/// later layer can override a single field without discarding the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Directory the engine writes emitted assets into. When absent after
    /// the merge, the in-memory channel is selected at assembly time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Name template for the entry asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Force the in-memory channel even when `path` is set.
    #[serde(default)]
    pub memory: bool,

    /// Public URL prefix baked into emitted asset references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

/// Main compiler configuration.
///
/// Produced by merging the four configuration layers; see
/// [`merge_layers`](crate::merge::merge_layers) for the layering rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Project base directory. Discovery and plugin construction run
    /// relative to it.
    #[serde(default = "default_context")]
    pub context: PathBuf,

    /// Entry points handed to the engine.
    #[serde(default)]
    pub entry: Vec<String>,

    /// Abort the build on the first error instead of collecting errors.
    #[serde(default)]
    pub bail: bool,

    /// Output destination options.
    #[serde(default)]
    pub output: OutputOptions,

    /// Declarative plugin descriptors, concatenated across layers.
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,

    /// Option keys the typed model does not name. A later layer's value
    /// overrides an earlier one like any other scalar key.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompilerOptions {
    /// Create from a merged configuration value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// Convert to a configuration value, e.g. for use as a merge layer.
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// The default configuration layer.
    ///
    /// Returns a fresh value per call; there is no shared mutable default
    /// state, so concurrent assemblies cannot interfere. Fail-fast behavior
    /// is on and no persistent output destination is set, which makes
    /// in-memory capture the default channel unless a later layer overrides
    /// it.
    pub fn defaults() -> Self {
        Self {
            bail: true,
            ..Self::default()
        }
    }

    /// Whether the merged options select the in-memory output channel.
    pub fn uses_memory_channel(&self) -> bool {
        self.output.memory || self.output.path.is_none()
    }

    /// Look up an unmodeled option key.
    pub fn get_extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            context: default_context(),
            entry: vec![],
            bail: false,
            output: OutputOptions::default(),
            plugins: Vec::new(),
            extra: Map::new(),
        }
    }
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_fresh_per_call() {
        let mut a = CompilerOptions::defaults();
        let b = CompilerOptions::defaults();
        a.entry.push("src/index.js".to_string());
        assert!(b.entry.is_empty());
    }

    #[test]
    fn defaults_force_fail_fast_and_memory_channel() {
        let options = CompilerOptions::defaults();
        assert!(options.bail);
        assert!(options.output.path.is_none());
        assert!(options.uses_memory_channel());
    }

    #[test]
    fn from_value_parses_typed_fields() {
        let options = CompilerOptions::from_value(json!({
            "entry": ["src/index.js"],
            "output": {"path": "/dist", "filename": "bundle.js"}
        }))
        .unwrap();

        assert_eq!(options.entry, vec!["src/index.js"]);
        assert_eq!(options.output.path, Some(PathBuf::from("/dist")));
        assert!(!options.uses_memory_channel());
    }

    #[test]
    fn unmodeled_keys_land_in_extra() {
        let options = CompilerOptions::from_value(json!({
            "entry": ["src/index.js"],
            "devtool": "source-map"
        }))
        .unwrap();

        assert_eq!(options.get_extra("devtool"), Some(&json!("source-map")));
    }

    #[test]
    fn memory_flag_overrides_persistent_path() {
        let options = CompilerOptions::from_value(json!({
            "output": {"path": "/dist", "memory": true}
        }))
        .unwrap();

        assert!(options.uses_memory_channel());
    }
}
