// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep info` command implementation.

use colored::Colorize;
use modkeep_core::ModkeepError;

use crate::host::{spinner, Host};

pub async fn run_info(host: &Host, name: &str, json: bool) -> Result<(), ModkeepError> {
    let id = host.registry.parse_id(name)?;
    let bar = spinner(format!("Fetching metadata for {id}..."));
    let result = host.registry.metadata(name).await;
    bar.finish_and_clear();
    let metadata = result?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&metadata)
                .map_err(|e| ModkeepError::Internal(format!("info serialization failed: {e}")))?
        );
        return Ok(());
    }

    println!("{}", "Plugin information:".green().bold());
    println!("  Name:        {}", metadata.name.blue());
    println!("  Latest:      {}", metadata.latest_version.yellow());
    println!("  Author:      {}", metadata.author.cyan());
    println!("  Description: {}", metadata.description);
    let versions: Vec<&str> = metadata.versions.keys().map(String::as_str).collect();
    println!("  Versions:    {}", versions.join(", ").dimmed());
    Ok(())
}
