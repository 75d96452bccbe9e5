// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Modkeep integration tests.
//!
//! Provides [`MemoryBackend`], an in-memory [`RegistryBackend`] with fetch
//! counters (so tests can assert that a cache hit skips the backend), and a
//! handful of WAT-authored module fixtures.

pub mod backend;
pub mod fixtures;

pub use backend::MemoryBackend;
