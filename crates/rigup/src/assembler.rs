//! Option assembly: the façade's entry point.
//!
//! The assembler layers four option sources (defaults, project manifest,
//! project config file, explicit overrides), resolves declarative plugin
//! descriptors, hands the merged result to the engine factory, and selects
//! the output channel for the compiler handle it returns. Every failure on
//! this path is synchronous; a handle is only returned once assembly fully
//! succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use rigup_config::{
    CompilerOptions, ConfigDiscovery, Layer, PluginSpec, Source, merge_layers,
};

use crate::compiler::{Compiler, OutputChannel};
use crate::engine::EngineFactory;
use crate::memfs::MemorySink;
use crate::plugins::{PluginEntry, PluginFactory, SharedPlugin, resolve_plugins};
use crate::sink::DiskSink;
use crate::{Error, Result};

/// Explicit caller options: the last configuration layer.
///
/// Every field is optional; only what the caller sets takes part in the
/// merge, so an unset field never shadows a value from an earlier layer.
#[derive(Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    bail: Option<bool>,

    #[serde(skip_serializing_if = "OutputOverrides::is_empty")]
    output: OutputOverrides,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<PluginSpec>,

    #[serde(flatten)]
    extra: Map<String, Value>,

    #[serde(skip)]
    instances: Vec<SharedPlugin>,
}

/// Partial output options for the explicit layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

impl OutputOverrides {
    fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.filename.is_none()
            && self.memory.is_none()
            && self.public_path.is_none()
    }
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project base directory carried inside the options, for the
    /// overrides-first assembly variant.
    pub fn context(mut self, context: impl Into<PathBuf>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn entry(mut self, entry: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.entry = Some(entry.into_iter().map(Into::into).collect());
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.bail = Some(bail);
        self
    }

    /// Persistent output directory. Setting it selects the disk channel
    /// unless the memory flag wins.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.path = Some(path.into());
        self
    }

    pub fn output_filename(mut self, filename: impl Into<String>) -> Self {
        self.output.filename = Some(filename.into());
        self
    }

    /// Force or suppress the in-memory channel.
    pub fn memory(mut self, memory: bool) -> Self {
        self.output.memory = Some(memory);
        self
    }

    pub fn public_path(mut self, public_path: impl Into<String>) -> Self {
        self.output.public_path = Some(public_path.into());
        self
    }

    /// Add a declarative plugin descriptor to the explicit layer.
    pub fn plugin_spec(mut self, spec: PluginSpec) -> Self {
        self.plugins.push(spec);
        self
    }

    /// Add a pre-constructed plugin. It passes through resolution
    /// unchanged, after all constructed descriptors.
    pub fn plugin(mut self, plugin: SharedPlugin) -> Self {
        self.instances.push(plugin);
        self
    }

    /// Add either kind of entry.
    pub fn plugin_entry(self, entry: PluginEntry) -> Self {
        match entry {
            PluginEntry::Spec(spec) => self.plugin_spec(spec),
            PluginEntry::Instance(plugin) => self.plugin(plugin),
        }
    }

    /// Set an option key the typed surface does not name.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    fn to_layer(&self) -> Result<Layer> {
        let value = serde_json::to_value(self)
            .map_err(|e| Error::InvalidOptions(format!("overrides did not serialize: {}", e)))?;
        Ok(Layer::new(Source::Explicit, value)?)
    }
}

/// Builder producing a ready-to-run [`Compiler`] handle.
///
/// # Example
///
/// ```no_run
/// use rigup::{Assembler, Overrides};
/// # fn factory() -> std::sync::Arc<dyn rigup::EngineFactory> { unimplemented!() }
///
/// # fn example() -> rigup::Result<()> {
/// let compiler = Assembler::new("./my-project")
///     .overrides(Overrides::new().entry(["src/index.js"]))
///     .engine(factory())
///     .assemble()?;
/// # Ok(())
/// # }
/// ```
pub struct Assembler {
    base_dir: PathBuf,
    overrides: Overrides,
    engine_factory: Option<Arc<dyn EngineFactory>>,
    plugin_factory: PluginFactory,
}

impl Assembler {
    /// Assemble for a project base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            overrides: Overrides::default(),
            engine_factory: None,
            plugin_factory: PluginFactory::new(),
        }
    }

    /// Assemble from an options object that carries its own base directory
    /// (current directory when unset).
    pub fn from_overrides(overrides: Overrides) -> Self {
        let base_dir = overrides
            .context
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            base_dir,
            overrides,
            engine_factory: None,
            plugin_factory: PluginFactory::new(),
        }
    }

    /// Set the explicit options layer.
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set the engine factory. Required.
    pub fn engine(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Set the plugin construction registry. Without one, any plugin
    /// descriptor in the merged options fails assembly.
    pub fn plugin_factory(mut self, factory: PluginFactory) -> Self {
        self.plugin_factory = factory;
        self
    }

    /// Run the assembly: merge layers, resolve plugins, create the engine,
    /// select the output channel.
    pub fn assemble(mut self) -> Result<Compiler> {
        let engine_factory = self.engine_factory.take().ok_or(Error::MissingEngineFactory)?;

        if self.overrides.context.is_none() {
            self.overrides.context = Some(self.base_dir.clone());
        }
        let instances = std::mem::take(&mut self.overrides.instances);

        let discovery = ConfigDiscovery::new(&self.base_dir);
        let layers = [
            Layer::new(Source::Defaults, CompilerOptions::defaults().to_value()?)?,
            discovery.manifest_layer()?,
            discovery.file_layer()?,
            self.overrides.to_layer()?,
        ];

        let merged = merge_layers(&layers);
        let options = CompilerOptions::from_value(merged)?;
        tracing::debug!(
            context = %options.context.display(),
            entries = options.entry.len(),
            plugins = options.plugins.len(),
            "merged compiler options"
        );

        let plugins = resolve_plugins(
            &options.plugins,
            instances,
            &self.base_dir,
            &self.plugin_factory,
        )?;

        let channel = if options.uses_memory_channel() {
            tracing::debug!("no persistent output destination, capturing in memory");
            OutputChannel::Memory {
                sink: MemorySink::new(),
            }
        } else {
            // uses_memory_channel() is false only when a path is present
            let root = options
                .output
                .path
                .clone()
                .ok_or_else(|| Error::InvalidOptions("output.path missing".to_string()))?;
            OutputChannel::Persistent {
                sink: Arc::new(DiskSink::new(&root)),
                root,
            }
        };

        // The factory gets its own copy; engine-side mutation cannot
        // corrupt the view held by the returned handle.
        let engine = engine_factory.create(options.clone(), plugins)?;

        Ok(Compiler::new(engine, options, channel))
    }
}
