//! Layered option merging.
//!
//! Layers merge strictly left to right. Each option key is merged with a
//! named strategy selected by table lookup, so the strategy choice is
//! testable in isolation from the merge loop itself.

use serde_json::{Map, Value};

use crate::layer::Layer;

/// Named merge strategy for one option key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The last layer defining the key wins wholesale.
    OverrideScalar,
    /// Sub-keys merge one level deep; later layers win per sub-key.
    MergeObjectShallow,
    /// Lists concatenate in layer order; falsy entries are dropped.
    ConcatList,
}

/// Strategy table.
///
/// `output` merges key-by-key so a caller can override one output property
/// without losing the rest; `plugins` concatenates so every layer's plugins
/// take part; everything else is last-write-wins.
pub fn strategy_for(key: &str) -> MergeStrategy {
    match key {
        "output" => MergeStrategy::MergeObjectShallow,
        "plugins" => MergeStrategy::ConcatList,
        _ => MergeStrategy::OverrideScalar,
    }
}

/// Merge configuration layers into a single options value.
///
/// Empty layers contribute nothing. The result is always an object.
pub fn merge_layers(layers: &[Layer]) -> Value {
    let mut result = Map::new();

    for layer in layers {
        if layer.is_empty() {
            continue;
        }
        tracing::debug!(
            source = layer.source().describe(),
            keys = layer.values().len(),
            "applying configuration layer"
        );

        for (key, value) in layer.values() {
            match strategy_for(key) {
                MergeStrategy::OverrideScalar => {
                    result.insert(key.clone(), value.clone());
                }
                MergeStrategy::MergeObjectShallow => {
                    merge_object_shallow(result.entry(key.clone()).or_insert(Value::Null), value);
                }
                MergeStrategy::ConcatList => {
                    concat_list(result.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
        }
    }

    Value::Object(result)
}

/// Merge `update` into `slot` one level deep. Sub-keys present in both
/// take the update's value; sub-keys only in `slot` survive.
fn merge_object_shallow(slot: &mut Value, update: &Value) {
    match (slot, update) {
        (Value::Object(existing), Value::Object(update_map)) => {
            for (key, value) in update_map {
                existing.insert(key.clone(), value.clone());
            }
        }
        (slot, update) => {
            *slot = update.clone();
        }
    }
}

/// Append `update` onto the list accumulated in `slot`, dropping falsy
/// entries. Non-array values are treated as single-element lists, so a
/// layer may declare one plugin without wrapping it.
fn concat_list(slot: &mut Value, update: &Value) {
    let mut items = match slot.take() {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    };

    match update {
        Value::Array(update_items) => items.extend(update_items.iter().cloned()),
        single => items.push(single.clone()),
    }

    items.retain(|item| !is_falsy(item));
    *slot = Value::Array(items);
}

fn is_falsy(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Source;
    use serde_json::json;

    fn layer(source: Source, value: Value) -> Layer {
        Layer::new(source, value).unwrap()
    }

    #[test]
    fn strategy_table_lookup() {
        assert_eq!(strategy_for("output"), MergeStrategy::MergeObjectShallow);
        assert_eq!(strategy_for("plugins"), MergeStrategy::ConcatList);
        assert_eq!(strategy_for("entry"), MergeStrategy::OverrideScalar);
        assert_eq!(strategy_for("bail"), MergeStrategy::OverrideScalar);
    }

    #[test]
    fn later_layer_overrides_scalar_keys() {
        let merged = merge_layers(&[
            layer(Source::Defaults, json!({"bail": true, "devtool": "eval"})),
            layer(Source::Manifest, json!({"devtool": "source-map"})),
            layer(Source::Explicit, json!({"bail": false})),
        ]);

        assert_eq!(merged["bail"], json!(false));
        assert_eq!(merged["devtool"], json!("source-map"));
    }

    #[test]
    fn output_merges_disjoint_sub_keys() {
        let merged = merge_layers(&[
            layer(Source::Manifest, json!({"output": {"path": "/dist"}})),
            layer(Source::Explicit, json!({"output": {"filename": "bundle.js"}})),
        ]);

        assert_eq!(merged["output"]["path"], json!("/dist"));
        assert_eq!(merged["output"]["filename"], json!("bundle.js"));
    }

    #[test]
    fn output_sub_key_conflicts_take_later_layer() {
        let merged = merge_layers(&[
            layer(Source::ConfigFile, json!({"output": {"path": "/dist"}})),
            layer(Source::Explicit, json!({"output": {"path": "/build"}})),
        ]);

        assert_eq!(merged["output"]["path"], json!("/build"));
    }

    #[test]
    fn plugins_concatenate_in_layer_order() {
        let merged = merge_layers(&[
            layer(
                Source::Manifest,
                json!({"plugins": [{"plugin": "a"}, {"plugin": "b"}]}),
            ),
            layer(Source::ConfigFile, json!({"plugins": [{"plugin": "c"}]})),
        ]);

        let names: Vec<&str> = merged["plugins"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["plugin"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn plugins_drop_falsy_entries() {
        let merged = merge_layers(&[
            layer(
                Source::ConfigFile,
                json!({"plugins": [{"plugin": "a"}, null, false]}),
            ),
            layer(Source::Explicit, json!({"plugins": [null, {"plugin": "b"}]})),
        ]);

        assert_eq!(merged["plugins"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn single_plugin_value_is_wrapped() {
        let merged = merge_layers(&[
            layer(Source::Manifest, json!({"plugins": {"plugin": "a"}})),
            layer(Source::Explicit, json!({"plugins": [{"plugin": "b"}]})),
        ]);

        let plugins = merged["plugins"].as_array().unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0]["plugin"], json!("a"));
    }

    #[test]
    fn empty_layers_are_skipped() {
        let merged = merge_layers(&[
            layer(Source::Defaults, json!({"bail": true})),
            Layer::empty(Source::Manifest),
            Layer::empty(Source::ConfigFile),
        ]);

        assert_eq!(merged["bail"], json!(true));
    }

    #[test]
    fn merge_of_no_layers_is_empty_object() {
        let merged = merge_layers(&[]);
        assert_eq!(merged, json!({}));
    }
}
