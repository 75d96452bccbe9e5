// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep install` command implementation.
//!
//! Registry identifiers go through the full fetch/validate/cache pipeline.
//! An argument naming an existing `.wasm` file skips the registry: the file
//! is validated and loaded once to prove it instantiates, but is not cached
//! (a local file has no registry version identity).

use std::path::Path;

use colored::Colorize;
use modkeep_core::{validate, ModkeepError};

use crate::host::{spinner, Host};

pub async fn run_install(
    host: &Host,
    name: &str,
    version: Option<&str>,
) -> Result<(), ModkeepError> {
    if name.ends_with(".wasm") && Path::new(name).exists() {
        return install_local(host, name);
    }

    let id = host.registry.parse_id(name)?;

    // A pin supplies the version when the caller does not.
    let pins = host.pins()?;
    let pinned = pins.get(&id.to_string());
    let effective = version.or(pinned);

    let bar = spinner(format!("Installing {id}..."));
    let result = host.registry.install(name, effective).await;
    bar.finish_and_clear();
    let report = result?;

    let source = if report.cache_hit { "cache" } else { "registry" };
    println!(
        "{} {} {} ({}, {} bytes)",
        "Installed".green().bold(),
        id.to_string().blue(),
        format!("v{}", report.version).yellow(),
        source,
        report.bytes.len()
    );
    if version.is_none() {
        if let Some(pinned) = pinned {
            println!("{}", format!("  pinned to {pinned}").dimmed());
        }
    }
    println!("{}", format!("  sha256 {}", report.checksum).dimmed());
    Ok(())
}

fn install_local(host: &Host, path: &str) -> Result<(), ModkeepError> {
    let bytes = std::fs::read(path)?;
    let result = validate::validate(&bytes);
    if !result.is_valid {
        return Err(ModkeepError::InvalidBinary {
            reason: result
                .error
                .unwrap_or_else(|| "validator rejected binary".to_string()),
        });
    }
    for warning in &result.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }

    // Prove the file actually compiles and instantiates.
    let name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("local-plugin")
        .to_string();
    host.plugins
        .with(|manager| manager.load_plugin(&name, bytes.clone()))?;

    println!(
        "{} {} ({} bytes, not cached)",
        "Validated".green().bold(),
        path.blue(),
        bytes.len()
    );
    if let Some(checksum) = result.checksum {
        println!("{}", format!("  sha256 {checksum}").dimmed());
    }
    Ok(())
}
