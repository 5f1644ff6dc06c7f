//! File-based discovery of the project configuration layers.
//!
//! Two conventional locations contribute layers: the project manifest's
//! dedicated options field and the project config file. Both are optional;
//! a missing file yields an empty layer, a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::layer::{Layer, Source};

/// Project manifest probed for the options field.
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest field holding compiler options.
pub const MANIFEST_FIELD: &str = "rigup";

/// Conventional project config file. Data-only by design: configuration is
/// not executable code in this target.
pub const CONFIG_FILE: &str = "rigup.toml";

/// Discovery of the manifest and config-file layers for one base directory.
///
/// Loading is synchronous and happens once per assembly.
///
/// # Example
///
/// ```no_run
/// use rigup_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let layers = discovery.layers().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a discovery rooted at a project base directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The manifest layer: the manifest's options field, when declared.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed manifest JSON and
    /// `ConfigError::NotAnObject` when the options field is not a table.
    pub fn manifest_layer(&self) -> Result<Layer> {
        let path = self.root.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Layer::empty(Source::Manifest));
        }

        let content = fs::read_to_string(&path)?;
        let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            file: path.clone(),
            hint: format!("invalid JSON: {}", e),
        })?;

        match parsed.get(MANIFEST_FIELD) {
            Some(field) if !field.is_null() => {
                tracing::debug!(file = %path.display(), "loaded manifest options field");
                Layer::new(Source::Manifest, field.clone())
            }
            _ => Ok(Layer::empty(Source::Manifest)),
        }
    }

    /// The config-file layer: the parsed config file, when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for invalid TOML.
    pub fn file_layer(&self) -> Result<Layer> {
        let path = self.root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Layer::empty(Source::ConfigFile));
        }

        let content = fs::read_to_string(&path)?;
        let toml_val: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            file: path.clone(),
            hint: format!("invalid TOML: {}", e),
        })?;
        let value = serde_json::to_value(toml_val).map_err(|e| ConfigError::Parse {
            file: path.clone(),
            hint: format!("TOML to JSON conversion failed: {}", e),
        })?;

        tracing::debug!(file = %path.display(), "loaded config file");
        Layer::new(Source::ConfigFile, value)
    }

    /// Both project layers, in merge order (manifest before config file).
    pub fn layers(&self) -> Result<Vec<Layer>> {
        Ok(vec![self.manifest_layer()?, self.file_layer()?])
    }
}
