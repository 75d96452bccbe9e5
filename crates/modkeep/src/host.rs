// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring for the command implementations.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use modkeep_core::ModkeepError;
use modkeep_registry::{CacheStore, GithubBackend, RegistryManager};
use modkeep_runtime::{PluginManager, SharedPlugins};

use crate::config::ModkeepConfig;
use crate::pins::PinSet;

/// Everything a command needs: config, the registry pipeline, and the
/// runtime. Built once per invocation.
pub struct Host {
    pub config: ModkeepConfig,
    pub registry: RegistryManager,
    pub plugins: SharedPlugins,
}

impl Host {
    pub fn new(config: ModkeepConfig) -> Result<Self, ModkeepError> {
        let plugins = SharedPlugins::new(PluginManager::new()?);
        let backend = Arc::new(GithubBackend::new(&config.registry));
        let registry =
            RegistryManager::new(backend, CacheStore::new(config.registry.cache_dir.clone()))
                .with_default_namespace(config.registry.default_namespace.clone())
                .with_active_set(Arc::new(plugins.clone()));
        Ok(Self {
            config,
            registry,
            plugins,
        })
    }

    pub fn pins(&self) -> Result<PinSet, ModkeepError> {
        PinSet::load(&self.config.pins_path())
    }
}

/// Spinner shown while a command waits on the network.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Displays a cache key (`owner_repo`) as the plugin name it was derived
/// from. GitHub owner names cannot contain underscores, so the first one is
/// always the separator.
pub fn display_name(cache_key: &str) -> String {
    cache_key.replacen('_', "/", 1)
}
