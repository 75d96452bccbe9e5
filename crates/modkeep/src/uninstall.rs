// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep uninstall` command implementation.
//!
//! Removes every cached version and drops any stale pin for the plugin.

use colored::Colorize;
use modkeep_core::ModkeepError;

use crate::host::Host;

pub async fn run_uninstall(host: &Host, name: &str, force: bool) -> Result<(), ModkeepError> {
    let id = host.registry.parse_id(name)?;
    let removed = host.registry.uninstall(name, force).await?;

    let mut pins = host.pins()?;
    if pins.remove(&id.to_string()) {
        pins.save()?;
    }

    if removed == 0 {
        println!("{} {} was not installed", "Note:".yellow().bold(), id);
    } else {
        println!(
            "{} {} ({} version{})",
            "Uninstalled".green().bold(),
            id.to_string().blue(),
            removed,
            if removed == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
