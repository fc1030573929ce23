// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # PromptOps CLI
//!
//! The `promptops` binary loads a registry configuration, seeds an in-memory
//! registry from it and reports on it.
//!
//! ## Commands
//!
//! - `promptops config show|validate|generate` - Configuration management
//! - `promptops compliance [--entity NAME]` - Run enabled policies against seeded entities
//! - `promptops status` - Registry counts and entity versions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use promptops_cli::commands::{self, ConfigCommand};

/// PromptOps registry - versioned prompts, governance checks and deployments
#[derive(Parser)]
#[command(name = "promptops")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "PROMPTOPS_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level.
    #[arg(long, global = true, env = "PROMPTOPS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Run governance policies against registry entities
    #[command(name = "compliance")]
    Compliance {
        /// Only check the entity with this name
        #[arg(long, value_name = "NAME")]
        entity: Option<String>,
    },

    /// Show registry counts and entity versions
    #[command(name = "status")]
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .clone()
        .or_else(|| commands::configured_log_level(cli.config.as_deref()))
        .unwrap_or_else(|| "info".to_string());
    init_logging(&level)?;
    debug!(level = %level, "Logging initialized");

    match cli.command {
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config),
        Some(Commands::Compliance { entity }) => commands::compliance::execute(cli.config, entity.as_deref()),
        Some(Commands::Status) => commands::status::execute(cli.config),
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
