// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry configuration model.
//!
//! A plain serde struct with compiled defaults; the CLI layers TOML and
//! environment overrides on top of it via figment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for the registry pipeline and the GitHub backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding cached plugin binaries.
    pub cache_dir: PathBuf,
    /// Owner substituted for bare `repo` identifiers.
    pub default_namespace: String,
    /// Base URL of the GitHub REST API (overridable for tests).
    pub api_base: String,
    /// Path of the metadata document inside a plugin repository.
    pub metadata_file: String,
    /// Release asset filename holding the plugin binary.
    pub asset_name: String,
    /// Optional API token for authenticated requests.
    pub token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".modkeep/cache"),
            default_namespace: modkeep_core::DEFAULT_NAMESPACE.to_string(),
            api_base: "https://api.github.com".to_string(),
            metadata_file: "modkeep.json".to_string(),
            asset_name: "plugin.wasm".to_string(),
            token: None,
        }
    }
}
