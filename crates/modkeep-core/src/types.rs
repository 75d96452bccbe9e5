// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared types for the Modkeep plugin host.
//!
//! [`PluginId`] is the canonical namespaced plugin name, [`PluginMetadata`]
//! mirrors the `modkeep.json` document published in plugin repositories, and
//! [`ValidationResult`] is the validator's per-call report.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModkeepError;

/// Owner used when an identifier is a bare repo name with no namespace.
pub const DEFAULT_NAMESPACE: &str = "modkeep-plugins";

/// A canonicalized plugin identifier: `owner/repo`.
///
/// Accepted input grammar: an optional leading `@` or `github:` prefix is
/// stripped; the rest is split on `/`. A single segment maps to
/// [`DEFAULT_NAMESPACE`]; with two or more segments the first is the owner
/// and the remainder (joined back with `/`) is the repo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId {
    pub owner: String,
    pub repo: String,
}

impl PluginId {
    /// Parses an identifier, falling back to [`DEFAULT_NAMESPACE`] for bare
    /// repo names.
    pub fn parse(input: &str) -> Result<Self, ModkeepError> {
        Self::parse_with_default(input, DEFAULT_NAMESPACE)
    }

    /// Parses an identifier with an explicit default owner for bare names.
    pub fn parse_with_default(input: &str, default_owner: &str) -> Result<Self, ModkeepError> {
        let clean = input
            .strip_prefix('@')
            .or_else(|| input.strip_prefix("github:"))
            .unwrap_or(input);

        if clean.is_empty() {
            return Err(ModkeepError::InvalidIdentifier {
                input: input.to_string(),
            });
        }

        let (owner, repo) = match clean.split_once('/') {
            None => (default_owner.to_string(), clean.to_string()),
            Some((owner, rest)) => (owner.to_string(), rest.to_string()),
        };

        if owner.is_empty() || repo.is_empty() {
            return Err(ModkeepError::InvalidIdentifier {
                input: input.to_string(),
            });
        }

        Ok(Self { owner, repo })
    }

    /// Stable on-disk key: the path separator is not filesystem-safe, so it
    /// is replaced wholesale.
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo).replace('/', "_")
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for PluginId {
    type Err = ModkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Per-version release record inside [`PluginMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Download URL for the release asset.
    pub url: String,
    /// SHA-256 hex digest the binary must hash to.
    pub checksum: String,
    /// Size of the binary in bytes.
    pub size: u64,
}

/// The metadata document a plugin repository publishes (`modkeep.json`).
///
/// Field names are camelCase on the wire to match the published format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub latest_version: String,
    pub versions: BTreeMap<String, VersionInfo>,
}

impl PluginMetadata {
    /// Enforces the metadata invariants: a non-empty version map whose keys
    /// include `latest_version`.
    pub fn validate(&self) -> Result<(), ModkeepError> {
        if self.versions.is_empty() {
            return Err(ModkeepError::InvalidMetadata {
                name: self.name.clone(),
                reason: "version map is empty".to_string(),
            });
        }
        if !self.versions.contains_key(&self.latest_version) {
            return Err(ModkeepError::InvalidMetadata {
                name: self.name.clone(),
                reason: format!(
                    "latest version '{}' is not in the version map",
                    self.latest_version
                ),
            });
        }
        Ok(())
    }
}

/// Report produced by a single validator call. Always built fresh; the
/// validator keeps no state between calls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    /// Whether the bytes are a well-formed module container.
    pub is_valid: bool,
    /// Reason the bytes were rejected, when `is_valid` is false.
    pub error: Option<String>,
    /// SHA-256 hex digest of the bytes, when `is_valid` is true.
    pub checksum: Option<String>,
    /// Non-fatal findings. Warnings never flip `is_valid`.
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_id_parses_owner_repo() {
        let id = PluginId::parse("acme/widgets").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.repo, "widgets");
        assert_eq!(id.to_string(), "acme/widgets");
    }

    #[test]
    fn plugin_id_strips_at_prefix() {
        let id = PluginId::parse("@acme/widgets").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.repo, "widgets");
    }

    #[test]
    fn plugin_id_strips_github_prefix() {
        let id = PluginId::parse("github:acme/widgets").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.repo, "widgets");
    }

    #[test]
    fn plugin_id_bare_name_uses_default_namespace() {
        let id = PluginId::parse("widgets").unwrap();
        assert_eq!(id.owner, DEFAULT_NAMESPACE);
        assert_eq!(id.repo, "widgets");

        let id = PluginId::parse_with_default("widgets", "custom-ns").unwrap();
        assert_eq!(id.owner, "custom-ns");
    }

    #[test]
    fn plugin_id_extra_segments_join_into_repo() {
        let id = PluginId::parse("acme/nested/widgets").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.repo, "nested/widgets");
    }

    #[test]
    fn plugin_id_rejects_empty_and_degenerate_inputs() {
        assert!(PluginId::parse("").is_err());
        assert!(PluginId::parse("@").is_err());
        assert!(PluginId::parse("github:").is_err());
        assert!(PluginId::parse("/repo").is_err());
        assert!(PluginId::parse("owner/").is_err());
    }

    #[test]
    fn cache_key_replaces_all_separators() {
        let id = PluginId::parse("acme/nested/widgets").unwrap();
        assert_eq!(id.cache_key(), "acme_nested_widgets");
    }

    #[test]
    fn metadata_deserializes_camel_case() {
        let json = r#"{
            "name": "acme/widgets",
            "description": "Widget plugin",
            "author": "Acme",
            "latestVersion": "1.0.0",
            "versions": {
                "1.0.0": {"url": "https://example.com/plugin.wasm", "checksum": "abc", "size": 1024}
            }
        }"#;
        let metadata: PluginMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.latest_version, "1.0.0");
        assert_eq!(metadata.versions["1.0.0"].size, 1024);
        metadata.validate().unwrap();
    }

    #[test]
    fn metadata_validate_rejects_empty_versions() {
        let metadata = PluginMetadata {
            name: "p".into(),
            description: String::new(),
            author: String::new(),
            latest_version: "1.0.0".into(),
            versions: BTreeMap::new(),
        };
        assert!(matches!(
            metadata.validate(),
            Err(ModkeepError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn metadata_validate_rejects_dangling_latest() {
        let mut versions = BTreeMap::new();
        versions.insert(
            "0.1.0".to_string(),
            VersionInfo {
                url: String::new(),
                checksum: String::new(),
                size: 0,
            },
        );
        let metadata = PluginMetadata {
            name: "p".into(),
            description: String::new(),
            author: String::new(),
            latest_version: "1.0.0".into(),
            versions,
        };
        assert!(metadata.validate().is_err());
    }
}
