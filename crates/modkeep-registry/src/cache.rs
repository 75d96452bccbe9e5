// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version-addressed on-disk cache of validated plugin binaries.
//!
//! Entries live in a single directory as `<owner>_<repo>@<version>.wasm`
//! files. Presence plus a matching checksum is the sole validity signal; no
//! index file exists. Writes go through a temporary file and a rename, so a
//! concurrent reader never observes partially written bytes, and a cancelled
//! write leaves nothing at the final path.

use std::io::Write;
use std::path::{Path, PathBuf};

use modkeep_core::{validate, ModkeepError, PluginId};
use tracing::{debug, warn};

/// Persisted, version-addressed storage of plugin binaries.
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, id: &PluginId, version: &str) -> PathBuf {
        self.root.join(format!("{}@{version}.wasm", id.cache_key()))
    }

    /// Reads the entry for `(id, version)` and re-validates it against the
    /// checksum recorded in the plugin's metadata.
    ///
    /// Both a missing file and a checksum mismatch are reported as a miss
    /// (`Ok(None)`), never a fatal error; a corrupt entry simply makes the
    /// caller fetch again. Only genuine I/O failures surface as errors.
    pub async fn get(
        &self,
        id: &PluginId,
        version: &str,
        expected_checksum: &str,
    ) -> Result<Option<Vec<u8>>, ModkeepError> {
        let path = self.entry_path(id, version);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let actual = validate::checksum(&bytes);
        if actual != expected_checksum {
            warn!(
                plugin = %id,
                version,
                expected = expected_checksum,
                actual = %actual,
                "corrupt cache entry, treating as miss"
            );
            return Ok(None);
        }

        debug!(plugin = %id, version, "cache hit");
        Ok(Some(bytes))
    }

    /// Returns true when a valid entry for `(id, version)` is present.
    pub async fn contains(
        &self,
        id: &PluginId,
        version: &str,
        expected_checksum: &str,
    ) -> Result<bool, ModkeepError> {
        Ok(self.get(id, version, expected_checksum).await?.is_some())
    }

    /// Atomically persists an entry for `(id, version)`.
    ///
    /// The bytes are written to a temporary file in the cache directory and
    /// renamed into place.
    pub async fn put(
        &self,
        id: &PluginId,
        version: &str,
        bytes: &[u8],
    ) -> Result<(), ModkeepError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.entry_path(id, version);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| ModkeepError::CacheIo {
            source: e.error,
        })?;

        debug!(plugin = %id, version, len = bytes.len(), "cached plugin binary");
        Ok(())
    }

    /// Lists cached entries as `(cache key, version)` pairs, sorted. A
    /// missing cache directory is an empty list.
    pub async fn entries(&self) -> Result<Vec<(String, String)>, ModkeepError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".wasm") else { continue };
            if let Some((key, version)) = stem.rsplit_once('@') {
                entries.push((key.to_string(), version.to_string()));
            }
        }

        entries.sort();
        Ok(entries)
    }

    /// Removes every cached version of `id`, returning how many entries were
    /// deleted. A missing cache directory counts as zero entries.
    pub async fn remove_all(&self, id: &PluginId) -> Result<usize, ModkeepError> {
        let prefix = format!("{}@", id.cache_key());
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&prefix) && name.ends_with(".wasm") {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        debug!(plugin = %id, removed, "removed cached versions");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_id() -> PluginId {
        PluginId::parse("acme/widgets").unwrap()
    }

    #[tokio::test]
    async fn cache_put_then_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let id = test_id();
        let bytes = b"\0asm\x01\0\0\0payload".to_vec();
        let checksum = validate::checksum(&bytes);

        store.put(&id, "1.0.0", &bytes).await.unwrap();
        let cached = store.get(&id, "1.0.0", &checksum).await.unwrap().unwrap();
        assert_eq!(cached, bytes);
    }

    #[tokio::test]
    async fn cache_get_missing_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let result = store.get(&test_id(), "1.0.0", "whatever").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn cache_get_missing_directory_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("never-created"));
        let result = store.get(&test_id(), "1.0.0", "whatever").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn cache_checksum_mismatch_is_miss_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let id = test_id();
        store.put(&id, "1.0.0", b"original bytes").await.unwrap();

        // Corrupt the entry on disk behind the store's back.
        let path = dir.path().join(format!("{}@1.0.0.wasm", id.cache_key()));
        std::fs::write(&path, b"tampered bytes").unwrap();

        let expected = validate::checksum(b"original bytes");
        let result = store.get(&id, "1.0.0", &expected).await.unwrap();
        assert!(result.is_none(), "corrupt entry must read as a miss");
    }

    #[tokio::test]
    async fn cache_put_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let id = test_id();

        store.put(&id, "1.0.0", b"first").await.unwrap();
        store.put(&id, "1.0.0", b"second").await.unwrap();

        let checksum = validate::checksum(b"second");
        let cached = store.get(&id, "1.0.0", &checksum).await.unwrap().unwrap();
        assert_eq!(cached, b"second");
    }

    #[tokio::test]
    async fn cache_put_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.put(&test_id(), "1.0.0", b"bytes").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with(".wasm"));
    }

    #[tokio::test]
    async fn cache_remove_all_deletes_every_version_of_one_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let id = test_id();
        let other = PluginId::parse("acme/other").unwrap();

        store.put(&id, "0.1.0", b"a").await.unwrap();
        store.put(&id, "1.0.0", b"b").await.unwrap();
        store.put(&other, "1.0.0", b"c").await.unwrap();

        let removed = store.remove_all(&id).await.unwrap();
        assert_eq!(removed, 2);

        // The other plugin's entry survives.
        let checksum = validate::checksum(b"c");
        assert!(store.get(&other, "1.0.0", &checksum).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cache_entries_lists_sorted_key_version_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let id = test_id();
        let other = PluginId::parse("acme/other").unwrap();

        store.put(&id, "1.0.0", b"a").await.unwrap();
        store.put(&id, "0.1.0", b"b").await.unwrap();
        store.put(&other, "2.0.0", b"c").await.unwrap();
        // Stray files are ignored.
        std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(
            entries,
            vec![
                ("acme_other".to_string(), "2.0.0".to_string()),
                ("acme_widgets".to_string(), "0.1.0".to_string()),
                ("acme_widgets".to_string(), "1.0.0".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn cache_entries_on_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("never-created"));
        assert!(store.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cache_remove_all_on_missing_directory_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("never-created"));
        assert_eq!(store.remove_all(&test_id()).await.unwrap(), 0);
    }
}
