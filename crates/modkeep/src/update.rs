// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep update` command implementation.
//!
//! Updates one plugin, or with `--all` every plugin present in the cache.
//! Pinned plugins are skipped unless `--force`; a pin exists precisely to
//! hold a version.

use colored::Colorize;
use modkeep_core::ModkeepError;
use modkeep_registry::UpdateOutcome;

use crate::host::{display_name, spinner, Host};

pub async fn run_update(
    host: &Host,
    name: Option<&str>,
    all: bool,
    force: bool,
) -> Result<(), ModkeepError> {
    if let Some(name) = name {
        let id = host.registry.parse_id(name)?;
        let pins = host.pins()?;
        if let Some(pinned) = pins.get(&id.to_string()) {
            if !force {
                return Err(ModkeepError::Config(format!(
                    "{id} is pinned to {pinned}; pass --force to update anyway"
                )));
            }
        }
        return update_one(host, name).await;
    }
    if !all {
        return Err(ModkeepError::Config(
            "specify a plugin or pass --all".to_string(),
        ));
    }

    let mut names: Vec<String> = host
        .registry
        .cache()
        .entries()
        .await?
        .into_iter()
        .map(|(key, _)| display_name(&key))
        .collect();
    names.sort();
    names.dedup();

    if names.is_empty() {
        println!("{}", "No plugins installed".yellow());
        return Ok(());
    }

    let pins = host.pins()?;
    let mut updated = 0;
    let mut skipped = 0;
    for name in &names {
        if pins.get(name).is_some() && !force {
            println!("{} {} (pinned)", "Skipped".yellow(), name.blue());
            skipped += 1;
            continue;
        }
        match update_one(host, name).await {
            Ok(()) => updated += 1,
            Err(e) => println!("{} {}: {e}", "Failed".red().bold(), name.blue()),
        }
    }

    println!(
        "{}",
        format!("Updated {updated} of {} plugin(s), {skipped} pinned", names.len())
            .green()
            .bold()
    );
    Ok(())
}

async fn update_one(host: &Host, name: &str) -> Result<(), ModkeepError> {
    let id = host.registry.parse_id(name)?;
    let bar = spinner(format!("Checking {id}..."));
    let result = host.registry.update(name).await;
    bar.finish_and_clear();

    match result? {
        UpdateOutcome::UpToDate { version } => {
            println!(
                "{} {} is already at {}",
                "Up to date:".green().bold(),
                id.to_string().blue(),
                format!("v{version}").yellow()
            );
        }
        UpdateOutcome::Updated(report) => {
            println!(
                "{} {} to {}",
                "Updated".green().bold(),
                id.to_string().blue(),
                format!("v{}", report.version).yellow()
            );
        }
    }
    Ok(())
}
