// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin runtime built on wasmtime.
//!
//! [`PluginManager`] compiles, instantiates, tracks, and invokes loaded
//! plugins. Each plugin gets a dedicated [`wasmtime::Store`], so dropping an
//! entry releases its instance and linear memory immediately. The manager is
//! a plain owned value, never process-global state; tests run several
//! isolated hosts side by side.
//!
//! Per-plugin lifecycle: load compiles and instantiates (`Loaded`), the
//! optional `init` export moves the plugin to `Active`, and removal from the
//! map is termination.

use std::collections::HashMap;
use std::fmt;

use modkeep_core::{ModkeepError, PluginMetadata};
use tracing::{debug, info, warn};
use wasmtime::{Engine, Extern, Func, Instance, Linker, Memory, MemoryType, Module, Store, Val};

/// Default size of the host-provided linear memory when a module declares no
/// `env.memory` import requirement of its own.
const DEFAULT_MEMORY_PAGES: u32 = 17;

/// Lifecycle state of a loaded plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Compiled and instantiated; the init hook has not run.
    Loaded,
    /// The init hook completed.
    Active,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginState::Loaded => write!(f, "loaded"),
            PluginState::Active => write!(f, "active"),
        }
    }
}

/// Typed result of looking a name up in an instance's export table.
///
/// Derived from the export descriptors; callers never poke at exports with
/// ad hoc "is it callable" reflection.
pub enum ExportLookup {
    /// The export exists and is a callable function.
    Found(Func),
    /// No export with that name.
    NotFound,
    /// An export exists under that name but is not a function (memory,
    /// global, table).
    NotCallable,
}

/// Outcome of [`PluginManager::cleanup_plugin`].
///
/// The entry is always removed; a failing hook is reported here rather than
/// masking the removal.
#[derive(Debug)]
pub struct CleanupReport {
    /// Whether a `cleanup` export existed and was invoked.
    pub hook_ran: bool,
    /// The hook's trap message, when it failed.
    pub hook_error: Option<String>,
}

/// A compiled-and-instantiated plugin tracked by the runtime.
pub struct ActivePlugin {
    name: String,
    bytes: Vec<u8>,
    metadata: Option<PluginMetadata>,
    module: Module,
    instance: Instance,
    store: Store<()>,
    state: PluginState,
}

impl ActivePlugin {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw binary the plugin was loaded from.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn metadata(&self) -> Option<&PluginMetadata> {
        self.metadata.as_ref()
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    /// Names of the module's exports, in declaration order.
    pub fn export_names(&self) -> Vec<String> {
        self.module
            .exports()
            .map(|e| e.name().to_string())
            .collect()
    }
}

impl fmt::Debug for ActivePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivePlugin")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("state", &self.state)
            .finish()
    }
}

/// Owner of the active-plugin set.
pub struct PluginManager {
    engine: Engine,
    plugins: HashMap<String, ActivePlugin>,
}

impl PluginManager {
    pub fn new() -> Result<Self, ModkeepError> {
        let engine = Engine::default();
        Ok(Self {
            engine,
            plugins: HashMap::new(),
        })
    }

    /// Compiles and instantiates a plugin, registering it under `name`.
    ///
    /// The import surface is minimal: a host linear memory at `env.memory`
    /// sized to the module's declared import requirement (17 pages when the
    /// module declares none), plus the `wbg.__wbindgen_init_externref_table`
    /// startup intrinsic wasm-bindgen modules expect. A `__wbindgen_start`
    /// export, when present, is invoked once as part of loading.
    ///
    /// Loading under an already-used name atomically swaps the entry; the
    /// prior instance's store is dropped, releasing its resources. On any
    /// failure the active map is left untouched.
    pub fn load_plugin(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), ModkeepError> {
        let module =
            Module::new(&self.engine, &bytes).map_err(|e| ModkeepError::Compile {
                name: name.to_string(),
                message: format!("{e:#}"),
            })?;
        debug!(
            plugin = name,
            exports = ?module.exports().map(|e| e.name().to_string()).collect::<Vec<_>>(),
            "compiled plugin module"
        );

        let mut store = Store::new(&self.engine, ());
        let mut linker = Linker::new(&self.engine);

        // Size the host memory to what the module asks for, if it imports one.
        let memory_type = module
            .imports()
            .find(|i| i.module() == "env" && i.name() == "memory")
            .and_then(|i| i.ty().memory().cloned())
            .unwrap_or_else(|| MemoryType::new(DEFAULT_MEMORY_PAGES, None));
        let memory =
            Memory::new(&mut store, memory_type).map_err(|e| ModkeepError::Instantiation {
                name: name.to_string(),
                message: format!("failed to create host memory: {e:#}"),
            })?;
        linker
            .define(&mut store, "env", "memory", memory)
            .map_err(|e| ModkeepError::Instantiation {
                name: name.to_string(),
                message: format!("failed to define host memory: {e:#}"),
            })?;
        linker
            .func_wrap("wbg", "__wbindgen_init_externref_table", || {})
            .map_err(|e| ModkeepError::Instantiation {
                name: name.to_string(),
                message: format!("failed to define startup intrinsic: {e:#}"),
            })?;

        let instance =
            linker
                .instantiate(&mut store, &module)
                .map_err(|e| ModkeepError::Instantiation {
                    name: name.to_string(),
                    message: format!("{e:#}"),
                })?;

        // wasm-bindgen modules expose their initializer as an export rather
        // than a start section; run it exactly once.
        if let Ok(start) = instance.get_typed_func::<(), ()>(&mut store, "__wbindgen_start") {
            start
                .call(&mut store, ())
                .map_err(|e| ModkeepError::Instantiation {
                    name: name.to_string(),
                    message: format!("start export trapped: {e:#}"),
                })?;
        }

        let replaced = self.plugins.insert(
            name.to_string(),
            ActivePlugin {
                name: name.to_string(),
                bytes,
                metadata: None,
                module,
                instance,
                store,
                state: PluginState::Loaded,
            },
        );
        if replaced.is_some() {
            // The old entry just dropped with its store; nothing lingers.
            info!(plugin = name, "replaced previously loaded plugin");
        } else {
            info!(plugin = name, "plugin loaded");
        }
        Ok(())
    }

    fn lookup(plugin: &mut ActivePlugin, function: &str) -> ExportLookup {
        match plugin.instance.get_export(&mut plugin.store, function) {
            Some(Extern::Func(func)) => ExportLookup::Found(func),
            Some(_) => ExportLookup::NotCallable,
            None => ExportLookup::NotFound,
        }
    }

    /// Runs the plugin's optional `init` export on the existing instance.
    ///
    /// Returns whether the hook existed and ran; a plugin without an `init`
    /// export is a no-op success. Never recompiles or reinstantiates.
    pub fn init_plugin(&mut self, name: &str) -> Result<bool, ModkeepError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| ModkeepError::PluginNotFound {
                name: name.to_string(),
            })?;

        let func = match Self::lookup(plugin, "init") {
            ExportLookup::Found(func) => func,
            ExportLookup::NotFound => {
                debug!(plugin = name, "no init export, skipping");
                plugin.state = PluginState::Active;
                return Ok(false);
            }
            ExportLookup::NotCallable => {
                return Err(ModkeepError::FunctionNotFound {
                    plugin: name.to_string(),
                    function: "init".to_string(),
                })
            }
        };

        func.call(&mut plugin.store, &[], &mut [])
            .map_err(|e| ModkeepError::Trap {
                plugin: name.to_string(),
                function: "init".to_string(),
                message: format!("{e:#}"),
            })?;
        plugin.state = PluginState::Active;
        info!(plugin = name, "init hook completed");
        Ok(true)
    }

    /// Invokes an exported function synchronously.
    ///
    /// Fails with [`ModkeepError::PluginNotFound`] for unknown plugins and
    /// [`ModkeepError::FunctionNotFound`] when the export is absent or not a
    /// function. A trap inside the module surfaces as a structured
    /// [`ModkeepError::Trap`]; the host process always survives.
    pub fn invoke(
        &mut self,
        name: &str,
        function: &str,
        args: &[Val],
    ) -> Result<Vec<Val>, ModkeepError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| ModkeepError::PluginNotFound {
                name: name.to_string(),
            })?;

        let func = match Self::lookup(plugin, function) {
            ExportLookup::Found(func) => func,
            ExportLookup::NotFound | ExportLookup::NotCallable => {
                return Err(ModkeepError::FunctionNotFound {
                    plugin: name.to_string(),
                    function: function.to_string(),
                })
            }
        };

        let ty = func.ty(&plugin.store);
        let mut results = vec![Val::I32(0); ty.results().len()];
        func.call(&mut plugin.store, args, &mut results)
            .map_err(|e| ModkeepError::Trap {
                plugin: name.to_string(),
                function: function.to_string(),
                message: format!("{e:#}"),
            })?;

        debug!(plugin = name, function, "invocation completed");
        Ok(results)
    }

    /// Runs the optional `cleanup` export, then removes the plugin.
    ///
    /// Removal happens regardless of the hook's outcome; a failing hook is
    /// logged and reported in the returned [`CleanupReport`] instead of
    /// masking the removal.
    pub fn cleanup_plugin(&mut self, name: &str) -> Result<CleanupReport, ModkeepError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| ModkeepError::PluginNotFound {
                name: name.to_string(),
            })?;

        let mut report = CleanupReport {
            hook_ran: false,
            hook_error: None,
        };
        if let ExportLookup::Found(func) = Self::lookup(plugin, "cleanup") {
            report.hook_ran = true;
            if let Err(e) = func.call(&mut plugin.store, &[], &mut []) {
                let message = format!("{e:#}");
                warn!(plugin = name, error = %message, "cleanup hook failed, removing anyway");
                report.hook_error = Some(message);
            }
        }

        self.plugins.remove(name);
        info!(plugin = name, hook_ran = report.hook_ran, "plugin cleaned up");
        Ok(report)
    }

    /// Unconditionally removes a plugin without invoking any hook. Returns
    /// whether an entry existed.
    pub fn kill_plugin(&mut self, name: &str) -> bool {
        let existed = self.plugins.remove(name).is_some();
        if existed {
            info!(plugin = name, "plugin killed");
        }
        existed
    }

    /// Unconditionally removes every plugin.
    pub fn kill_all(&mut self) {
        let count = self.plugins.len();
        self.plugins.clear();
        info!(count, "all plugins killed");
    }

    /// Names of all loaded plugins, sorted.
    pub fn list_plugins(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_plugin(&self, name: &str) -> Option<&ActivePlugin> {
        self.plugins.get(name)
    }

    /// Attaches registry metadata to a loaded plugin. Returns whether the
    /// plugin existed.
    pub fn update_plugin_metadata(&mut self, name: &str, metadata: PluginMetadata) -> bool {
        match self.plugins.get_mut(name) {
            Some(plugin) => {
                plugin.metadata = Some(metadata);
                true
            }
            None => false,
        }
    }
}
