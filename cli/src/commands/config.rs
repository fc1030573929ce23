// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use promptops_core::domain::policy::PolicyKind;
use promptops_core::domain::registry_config::{RegistryConfigManifest, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./promptops-config.yaml)
        #[arg(short, long, default_value = "./promptops-config.yaml")]
        output: PathBuf,

        /// Include example policies, prompts and agents
        #[arg(long)]
        examples: bool,
    },
}

pub fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, examples } => generate(&output, examples),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = RegistryConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./promptops-config.yaml");
        println!("  4. ~/.promptops/config.yaml");
        println!("  5. /etc/promptops/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Registry:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!("  Event bus capacity: {}", config.spec.event_bus_capacity);
    println!("  Log level: {}", config.spec.logging.level);
    println!();

    println!("{}", "Governance Policies:".bold());
    if config.spec.policies.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for policy in &config.spec.policies {
        let state = if policy.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!("  {} [{}] {}", policy.id.as_str().bold(), policy.category, state);
        println!("    {}", describe_kind(&policy.kind));
    }
    println!();

    println!("{}", "Seed Entities:".bold());
    for prompt in &config.spec.prompts {
        println!("  prompt {} ({})", prompt.name, prompt.content.model);
    }
    for agent in &config.spec.agents {
        println!(
            "  agent {} ({}, temperature {}, {})",
            agent.name, agent.content.model, agent.content.temperature, agent.content.environment
        );
    }
    if config.spec.prompts.is_empty() && config.spec.agents.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    println!();

    Ok(())
}

fn describe_kind(kind: &PolicyKind) -> String {
    match kind {
        PolicyKind::KeywordBlock { keywords, severity } => {
            format!("keyword block ({:?} on match): {}", severity, keywords.join(", "))
        }
        PolicyKind::PatternMatch { pattern, severity } => {
            format!("pattern match ({:?} on match): {}", severity, pattern)
        }
        PolicyKind::MaxLength { max_chars } => format!("max length: {} characters", max_chars),
        PolicyKind::Custom { id } => format!("custom evaluator: {}", id),
    }
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = RegistryConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: &Path, with_examples: bool) -> Result<()> {
    std::fs::write(output, sample_config(with_examples))
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn sample_config(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}
