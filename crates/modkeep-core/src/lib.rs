// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Modkeep plugin host.
//!
//! This crate provides the error taxonomy, shared types, the
//! [`RegistryBackend`] and [`ActivePlugins`] trait seams, and the pure
//! binary validator. The registry pipeline and the wasmtime runtime build on
//! top of these without depending on each other.

pub mod error;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export key items at crate root for ergonomic imports.
pub use error::ModkeepError;
pub use traits::{ActivePlugins, RegistryBackend};
pub use types::{PluginId, PluginMetadata, ValidationResult, VersionInfo, DEFAULT_NAMESPACE};
