// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the modkeep binary.
//!
//! Merge order (later overrides earlier): compiled defaults, the user XDG
//! config (`~/.config/modkeep/modkeep.toml`), a local `./modkeep.toml`, and
//! `MODKEEP_*` environment variables.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use modkeep_core::ModkeepError;
use modkeep_registry::RegistryConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModkeepConfig {
    /// Directory for host-side state (version pins live here).
    pub data_dir: PathBuf,
    /// Log filter applied when `MODKEEP_LOG` is unset.
    pub log: String,
    pub registry: RegistryConfig,
}

impl Default for ModkeepConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".modkeep"),
            log: "warn".to_string(),
            registry: RegistryConfig::default(),
        }
    }
}

impl ModkeepConfig {
    /// Path of the version-pin file.
    pub fn pins_path(&self) -> PathBuf {
        self.data_dir.join("pins.json")
    }
}

/// Loads configuration from the standard hierarchy with env overrides.
pub fn load() -> Result<ModkeepConfig, ModkeepError> {
    extract(
        Figment::new()
            .merge(Serialized::defaults(ModkeepConfig::default()))
            .merge(Toml::file(
                dirs::config_dir()
                    .map(|d| d.join("modkeep/modkeep.toml"))
                    .unwrap_or_default(),
            ))
            .merge(Toml::file("modkeep.toml"))
            .merge(env_provider()),
    )
}

/// Loads configuration from one explicit file, still honoring env overrides.
pub fn load_from_path(path: &Path) -> Result<ModkeepConfig, ModkeepError> {
    extract(
        Figment::new()
            .merge(Serialized::defaults(ModkeepConfig::default()))
            .merge(Toml::file(path))
            .merge(env_provider()),
    )
}

fn extract(figment: Figment) -> Result<ModkeepConfig, ModkeepError> {
    figment
        .extract()
        .map_err(|e| ModkeepError::Config(e.to_string()))
}

/// `MODKEEP_REGISTRY_CACHE_DIR` maps to `registry.cache_dir`; uses `map()`
/// rather than `split("_")` so key names containing underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("MODKEEP_")
        .map(|key| key.as_str().replacen("registry_", "registry.", 1).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_self_contained() {
        let config = ModkeepConfig::default();
        assert_eq!(config.data_dir, PathBuf::from(".modkeep"));
        assert_eq!(config.pins_path(), PathBuf::from(".modkeep/pins.json"));
        assert_eq!(config.registry.asset_name, "plugin.wasm");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modkeep.toml");
        std::fs::write(
            &path,
            r#"
            data_dir = "/var/lib/modkeep"

            [registry]
            default_namespace = "my-plugins"
            token = "ghp_test"
            "#,
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/modkeep"));
        assert_eq!(config.registry.default_namespace, "my-plugins");
        assert_eq!(config.registry.token.as_deref(), Some("ghp_test"));
        // Untouched fields keep their defaults.
        assert_eq!(config.registry.metadata_file, "modkeep.json");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modkeep.toml");
        std::fs::write(&path, "registry = 42").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ModkeepError::Config(_)));
    }
}
