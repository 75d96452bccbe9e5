// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modkeep run` command implementation.
//!
//! One-shot pipeline: install (cache-first), load into the runtime, run the
//! init hook, invoke the named export, print its results.

use colored::Colorize;
use modkeep_core::ModkeepError;
use wasmtime::Val;

use crate::host::{spinner, Host};

pub async fn run_run(
    host: &Host,
    name: &str,
    function: &str,
    args: &[String],
    version: Option<&str>,
) -> Result<(), ModkeepError> {
    let id = host.registry.parse_id(name)?;
    let pins = host.pins()?;
    let effective = version.or(pins.get(&id.to_string()));

    let bar = spinner(format!("Fetching {id}..."));
    let install = host.registry.install(name, effective).await;
    let metadata = host.registry.metadata(name).await;
    bar.finish_and_clear();
    let report = install?;

    let values = parse_args(args)?;
    let key = id.to_string();
    let results = host.plugins.with(|manager| {
        manager.load_plugin(&key, report.bytes.clone())?;
        if let Ok(metadata) = metadata {
            manager.update_plugin_metadata(&key, metadata);
        }
        manager.init_plugin(&key)?;
        manager.invoke(&key, function, &values)
    })?;

    println!(
        "{} {}::{} {}",
        "Ran".green().bold(),
        key.blue(),
        function.yellow(),
        format!("v{}", report.version).dimmed()
    );
    if results.is_empty() {
        println!("{}", "  (no return value)".dimmed());
    } else {
        for value in &results {
            println!("  {}", format_val(value));
        }
    }
    Ok(())
}

/// Parses a command-line argument into a WASM value. Integers that fit in
/// 32 bits become `i32` (the common wasm-bindgen ABI type), wider integers
/// `i64`, and anything with a decimal point `f64`.
fn parse_args(args: &[String]) -> Result<Vec<Val>, ModkeepError> {
    args.iter()
        .map(|arg| {
            if let Ok(value) = arg.parse::<i32>() {
                Ok(Val::I32(value))
            } else if let Ok(value) = arg.parse::<i64>() {
                Ok(Val::I64(value))
            } else if let Ok(value) = arg.parse::<f64>() {
                Ok(Val::F64(value.to_bits()))
            } else {
                Err(ModkeepError::Internal(format!(
                    "argument {arg:?} is not a number"
                )))
            }
        })
        .collect()
}

fn format_val(value: &Val) -> String {
    match value {
        Val::I32(v) => v.to_string(),
        Val::I64(v) => v.to_string(),
        Val::F32(bits) => f32::from_bits(*bits).to_string(),
        Val::F64(bits) => f64::from_bits(*bits).to_string(),
        other => format!("{other:?}"),
    }
}
