// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wasmtime-backed plugin runtime.

mod manager;

use std::sync::{Arc, Mutex};

use modkeep_core::ActivePlugins;

pub use manager::{ActivePlugin, CleanupReport, ExportLookup, PluginManager, PluginState};

/// Shared handle to a [`PluginManager`], cloneable across tasks.
///
/// The registry consults this through [`ActivePlugins`] before uninstalling,
/// so a plugin that is currently loaded cannot have its cached binaries
/// pulled out from under it.
#[derive(Clone)]
pub struct SharedPlugins(Arc<Mutex<PluginManager>>);

impl SharedPlugins {
    pub fn new(manager: PluginManager) -> Self {
        Self(Arc::new(Mutex::new(manager)))
    }

    /// Runs `f` with exclusive access to the manager.
    pub fn with<T>(&self, f: impl FnOnce(&mut PluginManager) -> T) -> T {
        let mut guard = match self.0.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic mid-operation; the manager holds
            // no invariants that a partial mutation could break, so continue.
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl ActivePlugins for SharedPlugins {
    fn is_active(&self, name: &str) -> bool {
        self.with(|manager| manager.get_plugin(name).is_some())
    }
}
