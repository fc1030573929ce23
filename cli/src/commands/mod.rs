// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the PromptOps CLI

pub mod compliance;
pub mod config;
pub mod status;

pub use self::config::ConfigCommand;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use promptops_core::application::lifecycle::StandardLifecycleService;
use promptops_core::application::registry_factory::build_from_config;
use promptops_core::domain::policy::CustomPolicyRegistry;
use promptops_core::domain::registry_config::RegistryConfigManifest;

/// Load, validate and seed a registry from the discovered configuration
pub fn load_registry(config_path: Option<PathBuf>) -> Result<(RegistryConfigManifest, StandardLifecycleService)> {
    let config = RegistryConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let service = build_from_config(&config, CustomPolicyRegistry::new())
        .context("Failed to seed registry from configuration")?;
    info!(registry = %config.metadata.name, "Registry loaded");

    Ok((config, service))
}

/// Log level declared by the explicit or discovered config file.
///
/// Runs before logging is initialized, so it reads the file directly and
/// leaves load errors to the command that loads the registry.
pub fn configured_log_level(config_path: Option<&Path>) -> Option<String> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(RegistryConfigManifest::discover_config)?;
    RegistryConfigManifest::from_yaml_file(path)
        .ok()
        .map(|config| config.spec.logging.level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_log_level_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promptops-config.yaml");
        std::fs::write(
            &path,
            "apiVersion: promptops.dev/v1\nkind: RegistryConfig\nmetadata:\n  name: r\nspec:\n  logging:\n    level: debug\n",
        )
        .unwrap();

        assert_eq!(configured_log_level(Some(path.as_path())).as_deref(), Some("debug"));
    }

    #[test]
    fn test_configured_log_level_ignores_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "apiVersion: [").unwrap();

        assert_eq!(configured_log_level(Some(path.as_path())), None);
        assert!(load_registry(Some(path)).is_err());
    }
}
