// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Install/uninstall/update/search/rollback orchestration.
//!
//! [`RegistryManager`] owns the [`CacheStore`] and talks to an abstract
//! [`RegistryBackend`]. The install pipeline is cache-first: a valid cached
//! entry short-circuits the backend entirely. Nothing is ever persisted for
//! a binary that failed validation or integrity checks, and overlapping
//! installs of the same `(plugin, version)` are serialized by a per-key
//! mutex so the backend is never hit twice for the same bytes.

use std::collections::HashMap;
use std::sync::Arc;

use modkeep_core::types::PluginMetadata;
use modkeep_core::{validate, ActivePlugins, ModkeepError, PluginId, RegistryBackend};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// Result of a successful install.
#[derive(Debug)]
pub struct InstallReport {
    /// The validated plugin binary.
    pub bytes: Vec<u8>,
    /// The concrete version that was resolved and installed.
    pub version: String,
    /// SHA-256 hex digest of `bytes`.
    pub checksum: String,
    /// True when the bytes came from the local cache without a backend fetch.
    pub cache_hit: bool,
}

/// Result of an update check.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The latest version is already cached with a matching checksum.
    UpToDate { version: String },
    /// A newer (or missing) version was installed.
    Updated(InstallReport),
}

/// Orchestrates metadata resolution, cache-first retrieval, backend
/// fallback, validation, and caching.
pub struct RegistryManager {
    backend: Arc<dyn RegistryBackend>,
    cache: CacheStore,
    default_namespace: String,
    active: Option<Arc<dyn ActivePlugins>>,
    install_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RegistryManager {
    pub fn new(backend: Arc<dyn RegistryBackend>, cache: CacheStore) -> Self {
        Self {
            backend,
            cache,
            default_namespace: modkeep_core::DEFAULT_NAMESPACE.to_string(),
            active: None,
            install_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying cache store.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Wires in the runtime's active-plugin view, consulted by uninstall.
    pub fn with_active_set(mut self, active: Arc<dyn ActivePlugins>) -> Self {
        self.active = Some(active);
        self
    }

    /// Overrides the owner used for bare `repo` identifiers.
    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Canonicalizes a raw identifier.
    pub fn parse_id(&self, name: &str) -> Result<PluginId, ModkeepError> {
        PluginId::parse_with_default(name, &self.default_namespace)
    }

    /// Fetches and invariant-checks a plugin's metadata.
    pub async fn metadata(&self, name: &str) -> Result<PluginMetadata, ModkeepError> {
        let id = self.parse_id(name)?;
        let metadata = self.backend.fetch_metadata(&id).await?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Resolves a concrete version: the requested one when listed, otherwise
    /// the metadata's latest.
    pub fn resolve_version(
        metadata: &PluginMetadata,
        requested: Option<&str>,
    ) -> Result<String, ModkeepError> {
        match requested {
            Some(version) if metadata.versions.contains_key(version) => Ok(version.to_string()),
            Some(version) => Err(ModkeepError::VersionNotFound {
                name: metadata.name.clone(),
                version: version.to_string(),
            }),
            None if metadata.versions.contains_key(&metadata.latest_version) => {
                Ok(metadata.latest_version.clone())
            }
            None => Err(ModkeepError::VersionNotFound {
                name: metadata.name.clone(),
                version: metadata.latest_version.clone(),
            }),
        }
    }

    async fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.install_locks.lock().await;
        // Entries no install currently holds are stale; drop them so the map
        // stays bounded by the number of in-flight installs.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Runs the full install pipeline and returns the validated bytes.
    ///
    /// Steps, each failing fast: parse identifier, fetch metadata, resolve
    /// version, try the cache (a hit returns without touching the backend),
    /// fetch from the backend, validate the binary, verify its checksum
    /// against the metadata record, persist atomically. A failed validation
    /// or checksum never reaches the cache.
    pub async fn install(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<InstallReport, ModkeepError> {
        let id = self.parse_id(name)?;
        let metadata = self.backend.fetch_metadata(&id).await?;
        metadata.validate()?;
        let version = Self::resolve_version(&metadata, version)?;
        let Some(info) = metadata.versions.get(&version) else {
            // resolve_version only returns listed versions.
            return Err(ModkeepError::VersionNotFound {
                name: id.to_string(),
                version,
            });
        };

        // Serialize concurrent installs of the same (plugin, version).
        let key = format!("{id}@{version}");
        let lock = self.lock_for(&key).await;
        let _guard = lock.lock().await;

        if let Some(bytes) = self.cache.get(&id, &version, &info.checksum).await? {
            info!(plugin = %id, version, "using cached plugin");
            return Ok(InstallReport {
                bytes,
                version,
                checksum: info.checksum.clone(),
                cache_hit: true,
            });
        }

        debug!(plugin = %id, version, "cache miss, fetching from backend");
        let bytes = self.backend.fetch_binary(&id, &version).await?;

        let result = validate::validate(&bytes);
        if !result.is_valid {
            return Err(ModkeepError::InvalidBinary {
                reason: result
                    .error
                    .unwrap_or_else(|| "validator rejected binary".to_string()),
            });
        }
        for warning in &result.warnings {
            warn!(plugin = %id, version, warning, "validator warning");
        }
        let actual = result
            .checksum
            .ok_or_else(|| ModkeepError::Internal("validator produced no checksum".to_string()))?;

        if !info.checksum.is_empty() && actual != info.checksum {
            return Err(ModkeepError::ChecksumMismatch {
                name: id.to_string(),
                version,
                expected: info.checksum.clone(),
                actual,
            });
        }

        self.cache.put(&id, &version, &bytes).await?;
        info!(plugin = %id, version, len = bytes.len(), "plugin installed");
        Ok(InstallReport {
            bytes,
            version,
            checksum: actual,
            cache_hit: false,
        })
    }

    /// Removes every cached version of a plugin.
    ///
    /// The runtime's active set is consulted before any file is touched:
    /// a loaded plugin blocks removal unless `force` is set. Returns the
    /// number of cache entries deleted.
    pub async fn uninstall(&self, name: &str, force: bool) -> Result<usize, ModkeepError> {
        let id = self.parse_id(name)?;

        if let Some(active) = &self.active {
            if active.is_active(&id.to_string()) && !force {
                return Err(ModkeepError::PluginInUse {
                    name: id.to_string(),
                });
            }
        }

        let removed = self.cache.remove_all(&id).await?;
        info!(plugin = %id, removed, force, "plugin uninstalled");
        Ok(removed)
    }

    /// Installs the latest version unless it is already cached intact.
    pub async fn update(&self, name: &str) -> Result<UpdateOutcome, ModkeepError> {
        let id = self.parse_id(name)?;
        let metadata = self.backend.fetch_metadata(&id).await?;
        metadata.validate()?;
        let latest = Self::resolve_version(&metadata, None)?;
        let Some(info) = metadata.versions.get(&latest) else {
            return Err(ModkeepError::VersionNotFound {
                name: id.to_string(),
                version: latest,
            });
        };

        if self.cache.contains(&id, &latest, &info.checksum).await? {
            debug!(plugin = %id, version = %latest, "already up to date");
            return Ok(UpdateOutcome::UpToDate { version: latest });
        }

        let report = self.install(name, Some(&latest)).await?;
        Ok(UpdateOutcome::Updated(report))
    }

    /// Case-insensitive substring search over the backend's known metadata
    /// set (name and description). A linear scan; fine while known
    /// registries stay small.
    pub fn search(&self, query: &str) -> Vec<PluginMetadata> {
        let needle = query.to_lowercase();
        self.backend
            .catalog()
            .into_iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Installs a previous version.
    ///
    /// With no explicit version, known versions are sorted by semantic
    /// version descending and the second entry (the one immediately prior to
    /// the latest) is selected; fewer than two versions is
    /// [`ModkeepError::NoPreviousVersion`]. Version keys that fail semver
    /// parsing are excluded from the ordering.
    pub async fn rollback(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<InstallReport, ModkeepError> {
        let id = self.parse_id(name)?;
        let metadata = self.backend.fetch_metadata(&id).await?;
        metadata.validate()?;

        let target = match version {
            Some(version) if metadata.versions.contains_key(version) => version.to_string(),
            Some(version) => {
                return Err(ModkeepError::VersionNotFound {
                    name: id.to_string(),
                    version: version.to_string(),
                })
            }
            None => {
                let mut ordered: Vec<(semver::Version, &String)> = metadata
                    .versions
                    .keys()
                    .filter_map(|v| semver::Version::parse(v).ok().map(|parsed| (parsed, v)))
                    .collect();
                ordered.sort_by(|a, b| b.0.cmp(&a.0));
                match ordered.get(1) {
                    Some((_, version)) => (*version).clone(),
                    None => {
                        return Err(ModkeepError::NoPreviousVersion {
                            name: id.to_string(),
                        })
                    }
                }
            }
        };

        info!(plugin = %id, version = %target, "rolling back");
        self.install(name, Some(&target)).await
    }
}
