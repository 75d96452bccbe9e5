// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry pipeline for the Modkeep plugin host.
//!
//! [`RegistryManager`] orchestrates metadata resolution, cache-first
//! retrieval, backend fallback, validation, and caching. The cache and the
//! GitHub backend are independent pieces wired together by the manager.

pub mod cache;
pub mod config;
pub mod github;
pub mod manager;

pub use cache::CacheStore;
pub use config::RegistryConfig;
pub use github::GithubBackend;
pub use manager::{InstallReport, RegistryManager, UpdateOutcome};
