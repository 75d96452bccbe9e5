// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version pins, persisted as a flat JSON object in the data directory.
//!
//! A pinned plugin installs at its pinned version whenever no explicit
//! version is requested, overriding the registry's latest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use modkeep_core::ModkeepError;

/// The contents of `pins.json`, keyed by canonical plugin name.
#[derive(Debug)]
pub struct PinSet {
    path: PathBuf,
    pins: BTreeMap<String, String>,
}

impl PinSet {
    /// Reads the pin file; a missing file is an empty set.
    pub fn load(path: &Path) -> Result<Self, ModkeepError> {
        let pins = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ModkeepError::Config(format!("{} is not valid JSON: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            pins,
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pins.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.pins.insert(name.into(), version.into());
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.pins.remove(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Writes the set back to disk, creating the data directory if needed.
    pub fn save(&self) -> Result<(), ModkeepError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.pins)
            .map_err(|e| ModkeepError::Internal(format!("pin serialization failed: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
