// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub-flavored registry backend.
//!
//! A plugin repository is any GitHub repo that publishes a `modkeep.json`
//! metadata document at its root and attaches a `plugin.wasm` asset to each
//! release tag. Metadata resolution checks repository existence first, then
//! fetches the document through the contents API; binaries come from the
//! release asset's download URL.

use async_trait::async_trait;
use base64::Engine as _;
use modkeep_core::{ModkeepError, PluginId, PluginMetadata, RegistryBackend};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RegistryConfig;

/// Response shape of `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
}

/// Response shape of `GET /repos/{owner}/{repo}/releases/tags/{tag}`.
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

/// [`RegistryBackend`] backed by the GitHub REST API.
pub struct GithubBackend {
    client: reqwest::Client,
    api_base: String,
    metadata_file: String,
    asset_name: String,
    token: Option<String>,
}

impl GithubBackend {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            metadata_file: config.metadata_file.clone(),
            asset_name: config.asset_name.clone(),
            token: config.token.clone(),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        // GitHub rejects requests without a User-Agent.
        let mut request = self.client.get(url).header("User-Agent", "modkeep");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn transport_error(message: &str, e: reqwest::Error) -> ModkeepError {
        ModkeepError::DownloadFailed {
            message: format!("{message}: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl RegistryBackend for GithubBackend {
    async fn fetch_metadata(&self, id: &PluginId) -> Result<PluginMetadata, ModkeepError> {
        // Repository existence check. A 404 here means the plugin does not
        // exist at all, as opposed to an existing repo without metadata.
        let repo_url = format!("{}/repos/{}/{}", self.api_base, id.owner, id.repo);
        let response = self
            .get(&repo_url)
            .send()
            .await
            .map_err(|e| Self::transport_error("repository lookup failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(plugin = %id, "repository not found");
            return Err(ModkeepError::MetadataNotFound {
                name: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ModkeepError::DownloadFailed {
                message: format!("repository lookup returned {}", response.status()),
                source: None,
            });
        }

        let contents_url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, id.owner, id.repo, self.metadata_file
        );
        let response = self
            .get(&contents_url)
            .send()
            .await
            .map_err(|e| Self::transport_error("metadata fetch failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(plugin = %id, file = %self.metadata_file, "repository has no metadata file");
            return Err(ModkeepError::MetadataNotFound {
                name: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ModkeepError::DownloadFailed {
                message: format!("metadata fetch returned {}", response.status()),
                source: None,
            });
        }

        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error("metadata response was not JSON", e))?;

        // The contents API base64-encodes with embedded newlines.
        let encoded: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ModkeepError::InvalidMetadata {
                name: id.to_string(),
                reason: format!("metadata content is not valid base64: {e}"),
            })?;

        let metadata: PluginMetadata =
            serde_json::from_slice(&decoded).map_err(|e| ModkeepError::InvalidMetadata {
                name: id.to_string(),
                reason: format!("metadata document does not parse: {e}"),
            })?;
        metadata.validate()?;

        debug!(plugin = %id, latest = %metadata.latest_version, "fetched metadata");
        Ok(metadata)
    }

    async fn fetch_binary(&self, id: &PluginId, version: &str) -> Result<Vec<u8>, ModkeepError> {
        let release_url = format!(
            "{}/repos/{}/{}/releases/tags/{version}",
            self.api_base, id.owner, id.repo
        );
        let response = self
            .get(&release_url)
            .send()
            .await
            .map_err(|e| Self::transport_error("release lookup failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ModkeepError::VersionNotFound {
                name: id.to_string(),
                version: version.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ModkeepError::DownloadFailed {
                message: format!("release lookup returned {}", response.status()),
                source: None,
            });
        }

        let release: ReleaseResponse = response
            .json()
            .await
            .map_err(|e| Self::transport_error("release response was not JSON", e))?;
        let asset = release
            .assets
            .iter()
            .find(|a| a.name == self.asset_name)
            .ok_or_else(|| ModkeepError::VersionNotFound {
                name: id.to_string(),
                version: version.to_string(),
            })?;

        let response = self
            .get(&asset.browser_download_url)
            .send()
            .await
            .map_err(|e| Self::transport_error("asset download failed", e))?;
        if !response.status().is_success() {
            return Err(ModkeepError::DownloadFailed {
                message: format!("asset download returned {}", response.status()),
                source: None,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::transport_error("asset body read failed", e))?;
        debug!(plugin = %id, version, len = bytes.len(), "downloaded plugin binary");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> GithubBackend {
        GithubBackend::new(&RegistryConfig {
            api_base: server.uri(),
            ..Default::default()
        })
    }

    fn metadata_json() -> String {
        r#"{
            "name": "acme/widgets",
            "description": "Widget plugin",
            "author": "Acme",
            "latestVersion": "1.0.0",
            "versions": {
                "1.0.0": {"url": "unused", "checksum": "abc", "size": 8}
            }
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn fetch_metadata_decodes_contents_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        // The contents API wraps base64 at 60 columns; include a newline to
        // prove the decoder tolerates it.
        let mut encoded = base64::engine::general_purpose::STANDARD.encode(metadata_json());
        encoded.insert(10, '\n');
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/contents/modkeep.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "content": encoded })),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let id = PluginId::parse("acme/widgets").unwrap();
        let metadata = backend.fetch_metadata(&id).await.unwrap();
        assert_eq!(metadata.latest_version, "1.0.0");
        assert_eq!(metadata.name, "acme/widgets");
    }

    #[tokio::test]
    async fn fetch_metadata_missing_repo_is_metadata_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let id = PluginId::parse("acme/ghost").unwrap();
        let err = backend.fetch_metadata(&id).await.unwrap_err();
        assert!(matches!(err, ModkeepError::MetadataNotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_metadata_repo_without_document_is_metadata_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/bare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/bare/contents/modkeep.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let id = PluginId::parse("acme/bare").unwrap();
        let err = backend.fetch_metadata(&id).await.unwrap_err();
        assert!(matches!(err, ModkeepError::MetadataNotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_binary_downloads_named_release_asset() {
        let server = MockServer::start().await;
        let asset_url = format!("{}/download/plugin.wasm", server.uri());
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/releases/tags/1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "assets": [
                    {"name": "checksums.txt", "browser_download_url": "unused"},
                    {"name": "plugin.wasm", "browser_download_url": asset_url}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/download/plugin.wasm"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\0asm\x01\0\0\0".to_vec()))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let id = PluginId::parse("acme/widgets").unwrap();
        let bytes = backend.fetch_binary(&id, "1.0.0").await.unwrap();
        assert_eq!(&bytes[..4], b"\0asm");
    }

    #[tokio::test]
    async fn fetch_binary_missing_release_is_version_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/releases/tags/9.9.9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let id = PluginId::parse("acme/widgets").unwrap();
        let err = backend.fetch_binary(&id, "9.9.9").await.unwrap_err();
        assert!(matches!(err, ModkeepError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_binary_release_without_asset_is_version_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/releases/tags/1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "assets": [{"name": "sources.tar.gz", "browser_download_url": "unused"}]
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let id = PluginId::parse("acme/widgets").unwrap();
        let err = backend.fetch_binary(&id, "1.0.0").await.unwrap_err();
        assert!(matches!(err, ModkeepError::VersionNotFound { .. }));
    }
}
