// SPDX-FileCopyrightText: 2026 Modkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modkeep - a WASM plugin host and package manager.
//!
//! This is the binary entry point for the modkeep CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod config;
mod host;
mod info;
mod install;
mod list;
mod pin;
mod pins;
mod rollback;
mod run;
mod search;
mod uninstall;
mod update;

use host::Host;

/// Modkeep - a WASM plugin host and package manager.
#[derive(Parser, Debug)]
#[command(name = "modkeep", version, about, long_about = None)]
struct Cli {
    /// Use this config file instead of the default lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Download, validate, and cache a plugin (or validate a local .wasm file).
    #[command(alias = "spin")]
    Install {
        /// Plugin identifier (`owner/repo`, `repo`, or a local .wasm path).
        name: String,
        /// Install this version instead of the latest.
        #[arg(long)]
        version: Option<String>,
    },
    /// Install a plugin and invoke one of its exported functions.
    Run {
        /// Plugin identifier.
        name: String,
        /// Exported function to call.
        function: String,
        /// Numeric arguments passed to the function.
        args: Vec<String>,
        /// Run this version instead of the latest.
        #[arg(long)]
        version: Option<String>,
    },
    /// List cached plugins.
    List {
        /// Output JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Show registry metadata for a plugin.
    Info {
        /// Plugin identifier.
        name: String,
        /// Output JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Remove all cached versions of a plugin.
    #[command(alias = "remove")]
    Uninstall {
        /// Plugin identifier.
        name: String,
        /// Remove even while the plugin is loaded.
        #[arg(long)]
        force: bool,
    },
    /// Search known plugins by name or description.
    Search {
        /// Case-insensitive substring query.
        query: String,
    },
    /// Update a plugin (or with --all, every cached plugin) to its latest version.
    Update {
        /// Plugin identifier.
        name: Option<String>,
        /// Update every cached plugin.
        #[arg(long)]
        all: bool,
        /// Update even plugins pinned to a version.
        #[arg(long)]
        force: bool,
    },
    /// Pin a plugin to a specific version.
    Pin {
        /// Plugin identifier.
        name: String,
        /// Version to pin (defaults to the highest cached version).
        #[arg(long)]
        version: Option<String>,
    },
    /// Reinstall the previous (or a named) version of a plugin.
    Rollback {
        /// Plugin identifier.
        name: String,
        /// Version to roll back to (defaults to the one before latest).
        #[arg(long)]
        version: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    };

    // MODKEEP_LOG overrides the configured filter, mirroring RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MODKEEP_LOG")
                .unwrap_or_else(|_| EnvFilter::new(config.log.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli, config).await {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli, config: config::ModkeepConfig) -> Result<(), modkeep_core::ModkeepError> {
    let host = Host::new(config)?;

    match cli.command {
        Commands::Install { name, version } => {
            install::run_install(&host, &name, version.as_deref()).await
        }
        Commands::Run {
            name,
            function,
            args,
            version,
        } => run::run_run(&host, &name, &function, &args, version.as_deref()).await,
        Commands::List { json } => list::run_list(&host, json).await,
        Commands::Info { name, json } => info::run_info(&host, &name, json).await,
        Commands::Uninstall { name, force } => {
            uninstall::run_uninstall(&host, &name, force).await
        }
        Commands::Search { query } => search::run_search(&host, &query),
        Commands::Update { name, all, force } => {
            update::run_update(&host, name.as_deref(), all, force).await
        }
        Commands::Pin { name, version } => pin::run_pin(&host, &name, version.as_deref()).await,
        Commands::Rollback { name, version } => {
            rollback::run_rollback(&host, &name, version.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn spin_is_an_install_alias() {
        let cli = Cli::try_parse_from(["modkeep", "spin", "acme/widgets", "--version", "1.0.0"])
            .unwrap();
        match cli.command {
            Commands::Install { name, version } => {
                assert_eq!(name, "acme/widgets");
                assert_eq!(version.as_deref(), Some("1.0.0"));
            }
            other => panic!("expected install, got {other:?}"),
        }
    }

    #[test]
    fn run_collects_trailing_args() {
        let cli = Cli::try_parse_from(["modkeep", "run", "acme/calc", "add", "2", "3"]).unwrap();
        match cli.command {
            Commands::Run {
                name,
                function,
                args,
                ..
            } => {
                assert_eq!(name, "acme/calc");
                assert_eq!(function, "add");
                assert_eq!(args, vec!["2".to_string(), "3".to_string()]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }
}
