// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep pin` command implementation.
//!
//! Records a version in the pin file after verifying the registry actually
//! lists it. Without `--version`, the highest cached version is pinned.

use colored::Colorize;
use modkeep_core::ModkeepError;

use crate::host::{spinner, Host};

pub async fn run_pin(host: &Host, name: &str, version: Option<&str>) -> Result<(), ModkeepError> {
    let id = host.registry.parse_id(name)?;

    let target = match version {
        Some(version) => version.to_string(),
        None => cached_version(host, &id.cache_key()).await?.ok_or_else(|| {
            ModkeepError::PluginNotFound {
                name: id.to_string(),
            }
        })?,
    };

    let bar = spinner(format!("Verifying {id} v{target}..."));
    let result = host.registry.metadata(name).await;
    bar.finish_and_clear();
    let metadata = result?;
    if !metadata.versions.contains_key(&target) {
        return Err(ModkeepError::VersionNotFound {
            name: id.to_string(),
            version: target,
        });
    }

    let mut pins = host.pins()?;
    pins.set(id.to_string(), target.clone());
    pins.save()?;

    println!(
        "{} {} to {}",
        "Pinned".green().bold(),
        id.to_string().blue(),
        format!("v{target}").yellow()
    );
    Ok(())
}

/// Highest semver among the plugin's cached entries.
async fn cached_version(host: &Host, cache_key: &str) -> Result<Option<String>, ModkeepError> {
    let mut versions: Vec<semver::Version> = host
        .registry
        .cache()
        .entries()
        .await?
        .into_iter()
        .filter(|(key, _)| key == cache_key)
        .filter_map(|(_, version)| semver::Version::parse(&version).ok())
        .collect();
    versions.sort();
    Ok(versions.pop().map(|v| v.to_string()))
}
