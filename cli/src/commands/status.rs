// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `promptops status` - registry counts and entity versions

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use promptops_core::application::lifecycle::{LifecycleService, RegistryCounts};

use super::load_registry;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (config, service) = load_registry(config_path)?;
    let counts = service.counts()?;

    println!("{} {}", "Registry:".bold(), config.metadata.name);
    println!();
    for line in render_counts(&counts) {
        println!("  {}", line);
    }
    println!();

    println!("{}", "Entities:".bold());
    let entities = service.list_entities(None)?;
    if entities.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for entity in &entities {
        let deployed = entity.history().iter().filter(|s| s.deployed).count();
        println!(
            "  {:<7} {:<24} v{:<3} {} deployed version(s)",
            entity.kind.to_string(),
            entity.name(),
            entity.current_version(),
            deployed
        );
    }

    Ok(())
}

pub fn render_counts(counts: &RegistryCounts) -> Vec<String> {
    vec![
        format!("Prompts:            {}", counts.prompts),
        format!("Agents:             {}", counts.agents),
        format!("Deployments:        {} ({} live)", counts.deployments, counts.live_deployments),
        format!("Enabled policies:   {}", counts.enabled_policies),
    ]
}
