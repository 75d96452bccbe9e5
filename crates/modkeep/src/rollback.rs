// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep rollback` command implementation.

use colored::Colorize;
use modkeep_core::ModkeepError;

use crate::host::{spinner, Host};

pub async fn run_rollback(
    host: &Host,
    name: &str,
    version: Option<&str>,
) -> Result<(), ModkeepError> {
    let id = host.registry.parse_id(name)?;
    let bar = spinner(format!("Rolling back {id}..."));
    let result = host.registry.rollback(name, version).await;
    bar.finish_and_clear();
    let report = result?;

    println!(
        "{} {} to {}",
        "Rolled back".green().bold(),
        id.to_string().blue(),
        format!("v{}", report.version).yellow()
    );
    Ok(())
}
