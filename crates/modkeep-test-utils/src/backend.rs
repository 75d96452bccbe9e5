// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory registry backend for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use modkeep_core::{ModkeepError, PluginId, PluginMetadata, RegistryBackend};

/// A [`RegistryBackend`] serving metadata and binaries from memory.
///
/// Every fetch bumps a counter, letting tests assert properties like "a
/// second install of the same version never contacts the backend".
#[derive(Default)]
pub struct MemoryBackend {
    plugins: HashMap<String, (PluginMetadata, HashMap<String, Vec<u8>>)>,
    metadata_fetches: AtomicUsize,
    binary_fetches: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its canonical `owner/repo` name with the
    /// given per-version binaries.
    pub fn register(
        &mut self,
        id: &PluginId,
        metadata: PluginMetadata,
        binaries: HashMap<String, Vec<u8>>,
    ) {
        self.plugins.insert(id.to_string(), (metadata, binaries));
    }

    /// Number of metadata fetches served so far.
    pub fn metadata_fetches(&self) -> usize {
        self.metadata_fetches.load(Ordering::SeqCst)
    }

    /// Number of binary fetches served so far.
    pub fn binary_fetches(&self) -> usize {
        self.binary_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryBackend for MemoryBackend {
    async fn fetch_metadata(&self, id: &PluginId) -> Result<PluginMetadata, ModkeepError> {
        self.metadata_fetches.fetch_add(1, Ordering::SeqCst);
        self.plugins
            .get(&id.to_string())
            .map(|(metadata, _)| metadata.clone())
            .ok_or_else(|| ModkeepError::MetadataNotFound {
                name: id.to_string(),
            })
    }

    async fn fetch_binary(&self, id: &PluginId, version: &str) -> Result<Vec<u8>, ModkeepError> {
        self.binary_fetches.fetch_add(1, Ordering::SeqCst);
        let (_, binaries) =
            self.plugins
                .get(&id.to_string())
                .ok_or_else(|| ModkeepError::MetadataNotFound {
                    name: id.to_string(),
                })?;
        binaries
            .get(version)
            .cloned()
            .ok_or_else(|| ModkeepError::VersionNotFound {
                name: id.to_string(),
                version: version.to_string(),
            })
    }

    fn catalog(&self) -> Vec<PluginMetadata> {
        let mut entries: Vec<PluginMetadata> = self
            .plugins
            .values()
            .map(|(metadata, _)| metadata.clone())
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn backend_counts_fetches() {
        let id = PluginId::parse("acme/widgets").unwrap();
        let mut backend = MemoryBackend::new();
        let bytes = fixtures::add_module();
        let metadata = fixtures::metadata_for(&id, "Widget plugin", &[("1.0.0", &bytes)]);
        backend.register(
            &id,
            metadata,
            HashMap::from([("1.0.0".to_string(), bytes)]),
        );

        backend.fetch_metadata(&id).await.unwrap();
        backend.fetch_metadata(&id).await.unwrap();
        backend.fetch_binary(&id, "1.0.0").await.unwrap();

        assert_eq!(backend.metadata_fetches(), 2);
        assert_eq!(backend.binary_fetches(), 1);
    }

    #[tokio::test]
    async fn backend_unknown_plugin_is_metadata_not_found() {
        let backend = MemoryBackend::new();
        let id = PluginId::parse("acme/missing").unwrap();
        let err = backend.fetch_metadata(&id).await.unwrap_err();
        assert!(matches!(err, ModkeepError::MetadataNotFound { .. }));
    }
}
