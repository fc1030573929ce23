// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Registry Configuration Types
//
// Defines the configuration schema for a PromptOps registry, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Governance policy set (declaration order is evaluation order)
// - Seed prompts and agents created at startup
// - Event bus and logging settings

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{AgentContent, EntityContent, PromptContent};
use crate::domain::policy::{GovernancePolicy, PolicyCategory, PolicyKind, Severity};

pub const API_VERSION: &str = "promptops.dev/v1";
pub const KIND: &str = "RegistryConfig";
pub const CONFIG_PATH_ENV: &str = "PROMPTOPS_CONFIG_PATH";
pub const LOG_LEVEL_ENV: &str = "PROMPTOPS_LOG_LEVEL";
pub const EVENT_BUS_CAPACITY_ENV: &str = "PROMPTOPS_EVENT_BUS_CAPACITY";

/// Top-level Kubernetes-style registry configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfigManifest {
    /// API version (must be "promptops.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "RegistryConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: RegistryConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable registry name
    pub name: String,

    /// Optional: Configuration version for tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfigSpec {
    /// Broadcast channel capacity for lifecycle events
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Governance policies, evaluated in this order
    #[serde(default)]
    pub policies: Vec<GovernancePolicy>,

    /// Prompts created when the registry starts
    #[serde(default)]
    pub prompts: Vec<SeedPrompt>,

    /// Agents created when the registry starts
    #[serde(default)]
    pub agents: Vec<SeedAgent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPrompt {
    pub name: String,
    #[serde(flatten)]
    pub content: PromptContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAgent {
    pub name: String,
    #[serde(flatten)]
    pub content: AgentContent,
}

impl SeedPrompt {
    pub fn entity_content(&self) -> EntityContent {
        EntityContent::Prompt(self.content.clone())
    }
}

impl SeedAgent {
    pub fn entity_content(&self) -> EntityContent {
        EntityContent::Agent(self.content.clone())
    }
}

fn default_event_bus_capacity() -> usize {
    crate::infrastructure::event_bus::DEFAULT_EVENT_BUS_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Starter policy set used when no configuration file is found
pub fn default_policies() -> Vec<GovernancePolicy> {
    vec![
        GovernancePolicy::new(
            "prompt-injection",
            "Prompt injection phrases",
            PolicyCategory::Security,
            PolicyKind::KeywordBlock {
                keywords: vec![
                    "ignore previous instructions".to_string(),
                    "disregard all prior".to_string(),
                ],
                severity: Severity::Fail,
            },
        )
        .with_description("Blocks instructions that try to override the system prompt"),
        GovernancePolicy::new(
            "pii-email",
            "Email addresses in prompt text",
            PolicyCategory::DataPrivacy,
            PolicyKind::PatternMatch {
                pattern: r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
                severity: Severity::Warning,
            },
        )
        .with_description("Flags literal email addresses that should be templated"),
        GovernancePolicy::new(
            "instruction-length",
            "Instruction length",
            PolicyCategory::Regulatory,
            PolicyKind::MaxLength { max_chars: 4000 },
        )
        .with_description("Warns on prompts too long to review"),
    ]
}

impl Default for RegistryConfigSpec {
    fn default() -> Self {
        Self {
            event_bus_capacity: default_event_bus_capacity(),
            logging: LoggingConfig::default(),
            policies: default_policies(),
            prompts: vec![],
            agents: vec![],
        }
    }
}

impl Default for RegistryConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "promptops-registry".to_string(),
                version: Some("1.0.0".to_string()),
                labels: HashMap::new(),
            },
            spec: RegistryConfigSpec::default(),
        }
    }
}

impl RegistryConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. PROMPTOPS_CONFIG_PATH environment variable
    /// 2. ./promptops-config.yaml (working directory)
    /// 3. ~/.promptops/config.yaml (user home)
    /// 4. /etc/promptops/config.yaml (system, Unix) or C:\ProgramData\PromptOps\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./promptops-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".promptops").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/promptops/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\PromptOps\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .with_context(|| format!("Failed to load config at {:?}", path))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(&config_path)
                .with_context(|| format!("Failed to load discovered config at {:?}", config_path))?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup` (environment in production, a map in tests)
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            let level = level.trim().to_lowercase();
            if matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                tracing::info!("Environment override: {}={}", LOG_LEVEL_ENV, level);
                self.spec.logging.level = level;
            } else {
                tracing::warn!(
                    "Invalid value for {}: '{}'. Expected trace/debug/info/warn/error. Ignoring.",
                    LOG_LEVEL_ENV,
                    level
                );
            }
        }

        if let Some(val) = lookup(EVENT_BUS_CAPACITY_ENV) {
            match val.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => {
                    tracing::info!("Environment override: {}={}", EVENT_BUS_CAPACITY_ENV, capacity);
                    self.spec.event_bus_capacity = capacity;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for {}: '{}'. Expected a positive integer. Ignoring.",
                        EVENT_BUS_CAPACITY_ENV,
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!("Invalid apiVersion: '{}'. Must be '{}'", self.api_version, API_VERSION);
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.trim().is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.event_bus_capacity == 0 {
            anyhow::bail!("spec.event_bus_capacity must be greater than zero");
        }

        let mut seen = HashSet::new();
        for policy in &self.spec.policies {
            policy
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid policy '{}': {}", policy.id, e))?;

            if !seen.insert(policy.id.clone()) {
                anyhow::bail!("Duplicate policy id: '{}'", policy.id);
            }

            if let PolicyKind::PatternMatch { pattern, .. } = &policy.kind {
                Regex::new(pattern)
                    .map_err(|e| anyhow::anyhow!("Policy '{}' has an invalid pattern: {}", policy.id, e))?;
            }
        }

        for prompt in &self.spec.prompts {
            if prompt.name.trim().is_empty() {
                anyhow::bail!("Seed prompt name cannot be empty");
            }
            prompt
                .entity_content()
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid seed prompt '{}': {}", prompt.name, e))?;
        }

        for agent in &self.spec.agents {
            if agent.name.trim().is_empty() {
                anyhow::bail!("Seed agent name cannot be empty");
            }
            agent
                .entity_content()
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid seed agent '{}': {}", agent.name, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::Environment;

    const SAMPLE: &str = r#"
apiVersion: promptops.dev/v1
kind: RegistryConfig
metadata:
  name: support-team
  labels:
    team: support
spec:
  event_bus_capacity: 64
  policies:
    - id: no-secrets
      name: No secrets
      category: security
      kind:
        type: keyword_block
        keywords: [password]
    - id: pii-phone
      name: Phone numbers
      category: data_privacy
      enabled: false
      kind:
        type: pattern_match
        pattern: '\d{3}-\d{4}'
        severity: warning
  prompts:
    - name: Summarizer
      system_instruction: Summarize tickets
      model: m1
  agents:
    - name: Triage
      system_instruction: Route incoming tickets
      model: m2
      environment: production
"#;

    #[test]
    fn test_default_manifest() {
        let manifest = RegistryConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert_eq!(manifest.spec.event_bus_capacity, 1000);
        assert_eq!(manifest.spec.policies.len(), 3);
        assert!(manifest.spec.prompts.is_empty());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let manifest = RegistryConfigManifest::from_yaml_str(SAMPLE).unwrap();
        manifest.validate().unwrap();

        assert_eq!(manifest.metadata.name, "support-team");
        assert_eq!(manifest.spec.event_bus_capacity, 64);
        assert_eq!(manifest.spec.logging.level, "info");
        assert_eq!(manifest.spec.policies.len(), 2);
        assert!(!manifest.spec.policies[1].enabled);
        assert_eq!(manifest.spec.prompts[0].content.user_template, "");

        let agent = &manifest.spec.agents[0].content;
        assert_eq!(agent.environment, Environment::Production);
        assert!((agent.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promptops-config.yaml");

        let manifest = RegistryConfigManifest::from_yaml_str(SAMPLE).unwrap();
        manifest.to_yaml_file(&path).unwrap();

        let loaded = RegistryConfigManifest::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.metadata.name, "support-team");
        assert_eq!(loaded.spec.policies, manifest.spec.policies);
        assert_eq!(loaded.spec.agents[0].name, "Triage");
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = RegistryConfigManifest::load_or_default(Some(missing)).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.yaml"));
    }

    #[test]
    fn test_broken_discovered_config_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovered.yaml");
        std::fs::write(&path, "apiVersion: [unterminated").unwrap();

        // Only test in this crate that reads CONFIG_PATH_ENV
        std::env::set_var(CONFIG_PATH_ENV, &path);
        let result = RegistryConfigManifest::load_or_default(None);
        std::env::remove_var(CONFIG_PATH_ENV);

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to load discovered config"));
        assert!(message.contains("discovered.yaml"));
    }

    #[test]
    fn test_overrides() {
        let mut manifest = RegistryConfigManifest::default();
        let env: HashMap<&str, &str> = HashMap::from([
            (LOG_LEVEL_ENV, "DEBUG"),
            (EVENT_BUS_CAPACITY_ENV, "16"),
        ]);
        manifest.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(manifest.spec.logging.level, "debug");
        assert_eq!(manifest.spec.event_bus_capacity, 16);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut manifest = RegistryConfigManifest::default();
        let env: HashMap<&str, &str> = HashMap::from([
            (LOG_LEVEL_ENV, "loud"),
            (EVENT_BUS_CAPACITY_ENV, "0"),
        ]);
        manifest.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(manifest.spec.logging.level, "info");
        assert_eq!(manifest.spec.event_bus_capacity, 1000);
    }

    #[test]
    fn test_validation() {
        let mut manifest = RegistryConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.policies.push(manifest.spec.policies[0].clone());
        assert!(manifest.validate().is_err());
        manifest.spec.policies.pop();

        manifest.spec.policies.push(GovernancePolicy::new(
            "bad-regex",
            "Bad regex",
            PolicyCategory::Security,
            PolicyKind::PatternMatch { pattern: "[".to_string(), severity: Severity::Fail },
        ));
        assert!(manifest.validate().is_err());
        manifest.spec.policies.pop();

        manifest.spec.prompts.push(SeedPrompt {
            name: "Empty".to_string(),
            content: PromptContent {
                system_instruction: String::new(),
                user_template: String::new(),
                model: "m1".to_string(),
            },
        });
        assert!(manifest.validate().is_err());
    }
}
