// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep list` command implementation.
//!
//! Lists the contents of the local cache, grouping versions per plugin.
//! `--json` emits a structured array for scripting.

use std::collections::BTreeMap;

use colored::Colorize;
use modkeep_core::ModkeepError;
use serde::Serialize;

use crate::host::{display_name, Host};

#[derive(Debug, Serialize)]
struct ListEntry {
    name: String,
    versions: Vec<String>,
    pinned: Option<String>,
}

pub async fn run_list(host: &Host, json: bool) -> Result<(), ModkeepError> {
    let pins = host.pins()?;
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, version) in host.registry.cache().entries().await? {
        grouped.entry(display_name(&key)).or_default().push(version);
    }

    let entries: Vec<ListEntry> = grouped
        .into_iter()
        .map(|(name, versions)| ListEntry {
            pinned: pins.get(&name).map(str::to_string),
            name,
            versions,
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries)
                .map_err(|e| ModkeepError::Internal(format!("list serialization failed: {e}")))?
        );
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No plugins installed".yellow());
        return Ok(());
    }

    println!("{}", "Installed plugins:".green().bold());
    for entry in &entries {
        let pin = match &entry.pinned {
            Some(version) => format!(" (pinned: {version})").dimmed().to_string(),
            None => String::new(),
        };
        println!(
            "  {} {}{}",
            entry.name.blue(),
            entry.versions.join(", ").yellow(),
            pin
        );
    }
    Ok(())
}
