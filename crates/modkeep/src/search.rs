// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep search` command implementation.
//!
//! Scans the backend's known metadata set. The GitHub backend exposes no
//! enumerable index, so against it this reports nothing found; backends with
//! a catalog surface matches here.

use colored::Colorize;
use modkeep_core::ModkeepError;

use crate::host::Host;

pub fn run_search(host: &Host, query: &str) -> Result<(), ModkeepError> {
    let results = host.registry.search(query);
    if results.is_empty() {
        println!("{}", format!("No plugins found matching {query:?}").yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} plugin(s):", results.len()).green().bold()
    );
    for metadata in &results {
        println!(
            "  {} {}",
            metadata.name.blue(),
            format!("v{}", metadata.latest_version).dimmed()
        );
        println!("    {}", metadata.description.dimmed());
    }
    Ok(())
}
