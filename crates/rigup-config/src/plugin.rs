use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative plugin descriptor.
///
/// A descriptor names a constructor key and carries the options forwarded to
/// it. Descriptors survive serialization, so they can come from any
/// configuration layer; construction into a live plugin happens at assembly
/// time through the factory registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Constructor key resolved against the plugin factory.
    pub plugin: String,

    /// Plugin-specific configuration forwarded during construction.
    #[serde(default)]
    pub options: Value,

    /// Whether the plugin should be constructed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl PluginSpec {
    /// Descriptor with no options.
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            options: Value::Null,
            enabled: true,
        }
    }

    /// Descriptor with construction options.
    pub fn with_options(plugin: impl Into<String>, options: Value) -> Self {
        Self {
            plugin: plugin.into(),
            options,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enabled_defaults_to_true() {
        let spec: PluginSpec = serde_json::from_value(json!({"plugin": "css"})).unwrap();
        assert!(spec.enabled);
        assert!(spec.options.is_null());
    }

    #[test]
    fn options_round_trip() {
        let spec = PluginSpec::with_options("define", json!({"NODE_ENV": "production"}));
        let value = serde_json::to_value(&spec).unwrap();
        let back: PluginSpec = serde_json::from_value(value).unwrap();
        assert_eq!(back, spec);
    }
}
