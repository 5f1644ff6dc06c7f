//! Configuration layers and their origins.

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Origin of a configuration layer, in strict merge order.
///
/// A later source's scalar keys always override an earlier source's same
/// key; see [`merge_layers`](crate::merge::merge_layers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    /// Built-in defaults.
    Defaults,
    /// The project manifest's dedicated options field.
    Manifest,
    /// The conventional project config file.
    ConfigFile,
    /// Options supplied explicitly by the caller.
    Explicit,
}

impl Source {
    /// Human-readable name, used in logs and errors.
    pub fn describe(self) -> &'static str {
        match self {
            Source::Defaults => "defaults",
            Source::Manifest => "manifest",
            Source::ConfigFile => "config file",
            Source::Explicit => "explicit options",
        }
    }
}

/// One configuration layer: a table of option values tagged with its origin.
#[derive(Debug, Clone)]
pub struct Layer {
    source: Source,
    values: Map<String, Value>,
}

impl Layer {
    /// Build a layer from a configuration value. The value must be an
    /// object (or null, which yields an empty layer).
    pub fn new(source: Source, value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { source, values }),
            Value::Null => Ok(Self::empty(source)),
            other => Err(ConfigError::NotAnObject {
                source_name: source.describe(),
                got: json_type_name(&other),
            }),
        }
    }

    /// A layer contributing nothing to the merge.
    pub fn empty(source: Source) -> Self {
        Self {
            source,
            values: Map::new(),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_order_matches_merge_order() {
        assert!(Source::Defaults < Source::Manifest);
        assert!(Source::Manifest < Source::ConfigFile);
        assert!(Source::ConfigFile < Source::Explicit);
    }

    #[test]
    fn object_value_becomes_layer() {
        let layer = Layer::new(Source::Manifest, json!({"bail": true})).unwrap();
        assert_eq!(layer.values().get("bail"), Some(&json!(true)));
        assert!(!layer.is_empty());
    }

    #[test]
    fn null_value_becomes_empty_layer() {
        let layer = Layer::new(Source::ConfigFile, Value::Null).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn scalar_value_is_rejected() {
        let result = Layer::new(Source::ConfigFile, json!("nope"));
        assert!(matches!(result, Err(ConfigError::NotAnObject { .. })));
    }
}
