// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Modkeep plugin host.

use thiserror::Error;

/// The primary error type used across the registry pipeline and the plugin
/// runtime.
///
/// Every pipeline step fails fast with a specific variant; nothing collapses
/// lower-level errors into a generic failure, and no step swallows an error
/// into a success path. Cache misses and corrupt cache entries are the only
/// locally-recovered conditions and never surface here.
#[derive(Debug, Error)]
pub enum ModkeepError {
    /// The plugin identifier does not match the `[@|github:]owner/repo` grammar.
    #[error("invalid plugin identifier: {input}")]
    InvalidIdentifier { input: String },

    /// The registry backend has no metadata for the plugin.
    #[error("no metadata found for plugin '{name}'")]
    MetadataNotFound { name: String },

    /// Metadata exists but violates its own invariants (empty version map,
    /// latest version missing from the map, unparseable document).
    #[error("invalid metadata for plugin '{name}': {reason}")]
    InvalidMetadata { name: String, reason: String },

    /// The requested version is not listed in the plugin's metadata.
    #[error("version '{version}' not found for plugin '{name}'")]
    VersionNotFound { name: String, version: String },

    /// Downloaded bytes do not hash to the checksum recorded in metadata.
    #[error("checksum mismatch for '{name}@{version}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    /// The binary is not a well-formed module container (bad magic signature).
    #[error("invalid plugin binary: {reason}")]
    InvalidBinary { reason: String },

    /// Fetching the binary from the registry backend failed.
    #[error("download failed: {message}")]
    DownloadFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The cache store could not read or write an entry.
    #[error("cache I/O error: {source}")]
    CacheIo {
        #[from]
        source: std::io::Error,
    },

    /// The bytes carried a valid magic signature but were structurally
    /// invalid and could not be compiled.
    #[error("failed to compile plugin '{name}': {message}")]
    Compile { name: String, message: String },

    /// Compilation succeeded but instantiation (including the start export)
    /// failed.
    #[error("failed to instantiate plugin '{name}': {message}")]
    Instantiation { name: String, message: String },

    /// The named plugin is not in the runtime's active set.
    #[error("plugin '{name}' is not loaded")]
    PluginNotFound { name: String },

    /// The export is absent from the instance's export table, or present but
    /// not a callable function.
    #[error("plugin '{plugin}' has no callable function '{function}'")]
    FunctionNotFound { plugin: String, function: String },

    /// The module aborted during an invocation. Distinct from host-side
    /// errors; the host process survives and reports this to the caller.
    #[error("plugin '{plugin}' trapped in '{function}': {message}")]
    Trap {
        plugin: String,
        function: String,
        message: String,
    },

    /// Uninstall refused because the plugin is active and `force` was not set.
    #[error("plugin '{name}' is currently in use (pass force to uninstall anyway)")]
    PluginInUse { name: String },

    /// Rollback found fewer than two known versions.
    #[error("no previous version available for plugin '{name}'")]
    NoPreviousVersion { name: String },

    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
