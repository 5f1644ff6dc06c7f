//! Plugin construction from declarative descriptors.
//!
//! Configuration layers carry plugins as data ([`PluginSpec`]); the factory
//! registry turns each descriptor into a live plugin at assembly time, with
//! the project base directory as construction context. Plugins the caller
//! already constructed pass through unchanged.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use rigup_config::PluginSpec;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::{Error, Result};

/// A constructed engine plugin.
///
/// The façade never invokes plugin behavior; it only assembles the ordered
/// list the engine receives. Engines define the richer hook surface.
pub trait Plugin: Send + Sync {
    /// Stable name, used in logs.
    fn name(&self) -> Cow<'_, str>;
}

pub type SharedPlugin = Arc<dyn Plugin>;

/// Constructor invoked for a matching descriptor. Receives the descriptor
/// options and the project base directory.
pub type PluginConstructor = Box<dyn Fn(&Value, &Path) -> Result<SharedPlugin> + Send + Sync>;

/// Construction registry keyed by the descriptor's `plugin` field.
///
/// # Example
///
/// ```
/// use rigup::plugins::{Plugin, PluginFactory};
/// use std::borrow::Cow;
/// use std::sync::Arc;
///
/// struct Banner(String);
/// impl Plugin for Banner {
///     fn name(&self) -> Cow<'_, str> {
///         Cow::Borrowed("banner")
///     }
/// }
///
/// let mut factory = PluginFactory::new();
/// factory.register("banner", |options, _context| {
///     let text = options["text"].as_str().unwrap_or_default().to_string();
///     Ok(Arc::new(Banner(text)))
/// });
/// assert!(factory.contains("banner"));
/// ```
#[derive(Default)]
pub struct PluginFactory {
    constructors: FxHashMap<String, PluginConstructor>,
}

impl PluginFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a descriptor key.
    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F)
    where
        F: Fn(&Value, &Path) -> Result<SharedPlugin> + Send + Sync + 'static,
    {
        self.constructors.insert(key.into(), Box::new(constructor));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Construct a plugin from its descriptor.
    ///
    /// # Errors
    ///
    /// `Error::UnknownPlugin` when no constructor is registered for the
    /// descriptor key; construction failures are returned as-is.
    pub fn construct(&self, spec: &PluginSpec, context: &Path) -> Result<SharedPlugin> {
        let constructor = self
            .constructors
            .get(&spec.plugin)
            .ok_or_else(|| Error::UnknownPlugin(spec.plugin.clone()))?;
        constructor(&spec.options, context)
    }
}

/// An entry in the caller-supplied plugin list.
pub enum PluginEntry {
    /// Declarative descriptor, constructed through the factory.
    Spec(PluginSpec),
    /// Pre-constructed instance, passed through unchanged.
    Instance(SharedPlugin),
}

/// Resolve the merged descriptors plus caller-supplied instances into the
/// final ordered plugin list.
///
/// Descriptors come first, in layer order; instances follow in the order
/// the caller gave them. Disabled descriptors are skipped.
pub(crate) fn resolve_plugins(
    specs: &[PluginSpec],
    instances: Vec<SharedPlugin>,
    context: &Path,
    factory: &PluginFactory,
) -> Result<Vec<SharedPlugin>> {
    let mut resolved = Vec::with_capacity(specs.len() + instances.len());

    for spec in specs {
        if !spec.enabled {
            tracing::debug!(plugin = %spec.plugin, "skipping disabled plugin");
            continue;
        }
        let plugin = factory.construct(spec, context)?;
        tracing::debug!(plugin = %plugin.name(), "constructed plugin");
        resolved.push(plugin);
    }

    resolved.extend(instances);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> Cow<'_, str> {
            Cow::Borrowed(self.0)
        }
    }

    fn factory_with(keys: &[&'static str]) -> PluginFactory {
        let mut factory = PluginFactory::new();
        for key in keys {
            let key = *key;
            factory.register(key, move |_options, _context| {
                Ok(Arc::new(Named(key)) as SharedPlugin)
            });
        }
        factory
    }

    #[test]
    fn construct_resolves_registered_key() {
        let factory = factory_with(&["css"]);
        let plugin = factory
            .construct(&PluginSpec::new("css"), Path::new("."))
            .unwrap();
        assert_eq!(plugin.name(), "css");
    }

    #[test]
    fn construct_rejects_unknown_key() {
        let factory = factory_with(&[]);
        let result = factory.construct(&PluginSpec::new("missing"), Path::new("."));
        assert!(matches!(result, Err(Error::UnknownPlugin(name)) if name == "missing"));
    }

    #[test]
    fn constructor_receives_descriptor_options() {
        let mut factory = PluginFactory::new();
        factory.register("banner", |options, _context| {
            assert_eq!(options["text"], json!("hello"));
            Ok(Arc::new(Named("banner")) as SharedPlugin)
        });

        let spec = PluginSpec::with_options("banner", json!({"text": "hello"}));
        factory.construct(&spec, Path::new(".")).unwrap();
    }

    #[test]
    fn resolve_keeps_descriptor_order_and_appends_instances() {
        let factory = factory_with(&["a", "b"]);
        let specs = vec![PluginSpec::new("a"), PluginSpec::new("b")];
        let instances: Vec<SharedPlugin> = vec![Arc::new(Named("c"))];

        let resolved = resolve_plugins(&specs, instances, Path::new("."), &factory).unwrap();
        let names: Vec<_> = resolved.iter().map(|p| p.name().into_owned()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn resolve_skips_disabled_specs() {
        let factory = factory_with(&["a", "b"]);
        let mut disabled = PluginSpec::new("a");
        disabled.enabled = false;
        let specs = vec![disabled, PluginSpec::new("b")];

        let resolved = resolve_plugins(&specs, vec![], Path::new("."), &factory).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name(), "b");
    }

    #[test]
    fn resolve_fails_fast_on_unknown_descriptor() {
        let factory = factory_with(&["a"]);
        let specs = vec![PluginSpec::new("a"), PluginSpec::new("missing")];

        let result = resolve_plugins(&specs, vec![], Path::new("."), &factory);
        assert!(result.is_err());
    }
}
