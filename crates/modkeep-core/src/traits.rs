// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the registry pipeline and its collaborators.

use async_trait::async_trait;

use crate::error::ModkeepError;
use crate::types::{PluginId, PluginMetadata};

/// Abstract source of plugin metadata and binaries.
///
/// The registry pipeline never assumes a transport; a GitHub-flavored
/// implementation (repository existence check, a metadata file at a fixed
/// path, a release asset with a fixed filename) is one valid backend, and the
/// in-memory backend used in tests is another.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Resolves an identifier to its metadata document.
    ///
    /// Fails with [`ModkeepError::MetadataNotFound`] when the backend knows
    /// nothing about the plugin.
    async fn fetch_metadata(&self, id: &PluginId) -> Result<PluginMetadata, ModkeepError>;

    /// Fetches the raw module bytes for a specific version.
    async fn fetch_binary(&self, id: &PluginId, version: &str) -> Result<Vec<u8>, ModkeepError>;

    /// The backend's known metadata set, used by search.
    ///
    /// Backends without an enumerable index (GitHub) return an empty catalog.
    /// Search is a linear scan over this set; acceptable only because known
    /// registries are small.
    fn catalog(&self) -> Vec<PluginMetadata> {
        Vec::new()
    }
}

/// Read-only view of the runtime's active-plugin set.
///
/// The registry consults this before uninstalling so it never deletes the
/// cache out from under a loaded plugin without `force`.
pub trait ActivePlugins: Send + Sync {
    /// Returns true if a plugin with this canonical name is currently loaded.
    fn is_active(&self, name: &str) -> bool;
}
