// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Versioned Entities
//!
//! Prompts and agents are both *versioned entities*: a named configuration
//! whose editable payload is captured in an append-only ledger of immutable
//! [`VersionSnapshot`]s.
//!
//! ## Ledger Invariants
//!
//! | Invariant | Guarantee |
//! |-----------|-----------|
//! | Monotonic | `current_version` starts at 1 and grows by exactly 1 per commit |
//! | Complete | `history().len() == current_version` |
//! | Ordered | `history()[0].version == current_version`, strictly decreasing, no gaps |
//! | Immutable | snapshot content and `created_at` never change after commit |
//!
//! The ledger is private to [`VersionedEntity`]; it is only extended through
//! [`VersionedEntity::commit_new_version`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::deployment::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Prompt,
    Agent,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Prompt => write!(f, "prompt"),
            EntityKind::Agent => write!(f, "agent"),
        }
    }
}

/// Editable payload of a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContent {
    /// System instruction sent ahead of the user prompt
    pub system_instruction: String,

    /// User prompt template (may contain `{{placeholders}}`)
    #[serde(default)]
    pub user_template: String,

    /// Target model identifier
    #[serde(default)]
    pub model: String,
}

/// Editable payload of an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContent {
    pub system_instruction: String,

    pub model: String,

    /// Sampling temperature (0.0 = deterministic, 2.0 = maximum)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment the agent is configured for
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityContent {
    Prompt(PromptContent),
    Agent(AgentContent),
}

/// Rejected input to a mutating operation. Messages are shown to users as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    TemperatureOutOfRange(f32),

    #[error("content kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("policy id cannot be empty")]
    EmptyPolicyId,

    #[error("policy '{0}' already exists")]
    DuplicatePolicy(String),
}

fn default_temperature() -> f32 {
    0.7
}

impl EntityContent {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityContent::Prompt(_) => EntityKind::Prompt,
            EntityContent::Agent(_) => EntityKind::Agent,
        }
    }

    pub fn system_instruction(&self) -> &str {
        match self {
            EntityContent::Prompt(p) => &p.system_instruction,
            EntityContent::Agent(a) => &a.system_instruction,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            EntityContent::Prompt(p) => &p.model,
            EntityContent::Agent(a) => &a.model,
        }
    }

    /// Text that governance policies inspect.
    pub fn inspected_text(&self) -> String {
        match self {
            EntityContent::Prompt(p) if p.user_template.is_empty() => p.system_instruction.clone(),
            EntityContent::Prompt(p) => format!("{}\n{}", p.system_instruction, p.user_template),
            EntityContent::Agent(a) => a.system_instruction.clone(),
        }
    }

    /// Check required fields.
    ///
    /// A prompt needs a system instruction plus a template or a model; an agent
    /// needs a system instruction, a model and an in-range temperature.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(self.system_instruction()) {
            return Err(ValidationError::MissingField("system_instruction"));
        }

        match self {
            EntityContent::Prompt(p) => {
                if is_blank(&p.user_template) && is_blank(&p.model) {
                    return Err(ValidationError::MissingField("user_template or model"));
                }
            }
            EntityContent::Agent(a) => {
                if is_blank(&a.model) {
                    return Err(ValidationError::MissingField("model"));
                }
                if !(0.0..=2.0).contains(&a.temperature) {
                    return Err(ValidationError::TemperatureOutOfRange(a.temperature));
                }
            }
        }

        Ok(())
    }
}

/// Immutable copy of an entity's content at one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version: u32,
    pub content: EntityContent,
    pub created_at: DateTime<Utc>,

    /// Set once a deployment pins this exact version
    pub deployed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionedEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    name: String,
    current_version: u32,
    content: EntityContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    version_history: Vec<VersionSnapshot>,
}

impl VersionedEntity {
    /// Create an entity at version 1 with a single-element history.
    pub fn create(name: impl Into<String>, content: EntityContent) -> Result<Self, ValidationError> {
        let name = validate_name(name.into())?;
        content.validate()?;

        let now = Utc::now();
        let first = VersionSnapshot {
            version: 1,
            content: content.clone(),
            created_at: now,
            deployed: false,
        };

        Ok(Self {
            id: EntityId::new(),
            kind: content.kind(),
            name,
            current_version: 1,
            content,
            created_at: now,
            updated_at: now,
            version_history: vec![first],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    pub fn content(&self) -> &EntityContent {
        &self.content
    }

    /// All snapshots, newest first
    pub fn history(&self) -> &[VersionSnapshot] {
        &self.version_history
    }

    pub fn current_snapshot(&self) -> &VersionSnapshot {
        // history is never empty: create() seeds version 1
        &self.version_history[0]
    }

    pub fn snapshot(&self, version: u32) -> Option<&VersionSnapshot> {
        if version == 0 || version > self.current_version {
            return None;
        }
        self.version_history.get((self.current_version - version) as usize)
    }

    /// Commit `new_content` as the next version.
    ///
    /// Every explicit save produces a version, even when the content is
    /// unchanged. On error the entity is left untouched.
    pub fn commit_new_version(&mut self, new_content: EntityContent) -> Result<&VersionSnapshot, ValidationError> {
        if is_blank(&self.name) {
            return Err(ValidationError::EmptyName);
        }
        if new_content.kind() != self.kind {
            return Err(ValidationError::KindMismatch {
                expected: self.kind,
                actual: new_content.kind(),
            });
        }
        new_content.validate()?;

        let now = Utc::now();
        let version = self.current_version + 1;
        self.version_history.insert(
            0,
            VersionSnapshot {
                version,
                content: new_content.clone(),
                created_at: now,
                deployed: false,
            },
        );
        self.current_version = version;
        self.content = new_content;
        self.updated_at = now;

        Ok(self.current_snapshot())
    }

    /// Change the display label. Does not create a version.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = validate_name(name.into())?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flag `version` as deployed. Returns false if no such version exists.
    pub(crate) fn mark_version_deployed(&mut self, version: u32) -> bool {
        if version == 0 || version > self.current_version {
            return false;
        }
        let index = (self.current_version - version) as usize;
        match self.version_history.get_mut(index) {
            Some(snapshot) => {
                snapshot.deployed = true;
                true
            }
            None => false,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn validate_name(name: String) -> Result<String, ValidationError> {
    if is_blank(&name) {
        return Err(ValidationError::EmptyName);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(model: &str) -> EntityContent {
        EntityContent::Prompt(PromptContent {
            system_instruction: "Summarize tickets".to_string(),
            user_template: String::new(),
            model: model.to_string(),
        })
    }

    fn agent(temperature: f32) -> EntityContent {
        EntityContent::Agent(AgentContent {
            system_instruction: "Triage incoming support mail".to_string(),
            model: "m1".to_string(),
            temperature,
            environment: Environment::Staging,
        })
    }

    #[test]
    fn test_create_starts_at_version_one() {
        let entity = VersionedEntity::create("Summarizer", prompt("m1")).unwrap();
        assert_eq!(entity.current_version(), 1);
        assert_eq!(entity.history().len(), 1);
        assert_eq!(entity.history()[0].version, 1);
        assert!(!entity.history()[0].deployed);
        assert_eq!(entity.kind, EntityKind::Prompt);
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let err = VersionedEntity::create("   ", prompt("m1")).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn test_commit_prepends_and_keeps_history() {
        let mut entity = VersionedEntity::create("Summarizer", prompt("m1")).unwrap();
        let original = entity.history()[0].clone();

        entity.commit_new_version(prompt("m2")).unwrap();

        assert_eq!(entity.current_version(), 2);
        assert_eq!(entity.history()[0].version, 2);
        assert_eq!(entity.history()[1], original);
        assert_eq!(entity.content().model(), "m2");
        assert_eq!(entity.snapshot(1).unwrap().content.model(), "m1");
    }

    #[test]
    fn test_history_is_gapless_after_many_commits() {
        let mut entity = VersionedEntity::create("Summarizer", prompt("m0")).unwrap();
        let first = entity.history()[0].clone();

        for n in 1..=25u32 {
            let committed = entity.commit_new_version(prompt(&format!("m{}", n))).unwrap().version;
            assert_eq!(committed, n + 1);
        }

        assert_eq!(entity.current_version(), 26);
        assert_eq!(entity.history().len(), 26);
        assert_eq!(entity.history()[0].version, entity.current_version());
        for pair in entity.history().windows(2) {
            assert_eq!(pair[0].version, pair[1].version + 1);
        }
        assert_eq!(entity.history().last(), Some(&first));
        assert_eq!(entity.snapshot(13).unwrap().content.model(), "m12");
    }

    #[test]
    fn test_commit_versions_even_without_change() {
        let mut entity = VersionedEntity::create("Summarizer", prompt("m1")).unwrap();
        entity.commit_new_version(prompt("m1")).unwrap();
        assert_eq!(entity.current_version(), 2);
    }

    #[test]
    fn test_failed_commit_leaves_entity_unchanged() {
        let mut entity = VersionedEntity::create("Triage", agent(0.5)).unwrap();

        let err = entity.commit_new_version(agent(3.5)).unwrap_err();
        assert_eq!(err, ValidationError::TemperatureOutOfRange(3.5));

        let err = entity.commit_new_version(prompt("m1")).unwrap_err();
        assert!(matches!(err, ValidationError::KindMismatch { .. }));

        assert_eq!(entity.current_version(), 1);
        assert_eq!(entity.history().len(), 1);
    }

    #[test]
    fn test_prompt_requires_template_or_model() {
        let content = EntityContent::Prompt(PromptContent {
            system_instruction: "Be brief".to_string(),
            user_template: String::new(),
            model: " ".to_string(),
        });
        assert_eq!(
            content.validate().unwrap_err(),
            ValidationError::MissingField("user_template or model")
        );

        let content = EntityContent::Prompt(PromptContent {
            system_instruction: String::new(),
            user_template: "{{ticket}}".to_string(),
            model: String::new(),
        });
        assert_eq!(
            content.validate().unwrap_err(),
            ValidationError::MissingField("system_instruction")
        );
    }

    #[test]
    fn test_rename_does_not_version() {
        let mut entity = VersionedEntity::create("Summarizer", prompt("m1")).unwrap();
        entity.rename("Ticket Summarizer").unwrap();
        assert_eq!(entity.name(), "Ticket Summarizer");
        assert_eq!(entity.current_version(), 1);
        assert_eq!(entity.rename(""), Err(ValidationError::EmptyName));
        assert_eq!(entity.name(), "Ticket Summarizer");
    }

    #[test]
    fn test_mark_version_deployed() {
        let mut entity = VersionedEntity::create("Summarizer", prompt("m1")).unwrap();
        entity.commit_new_version(prompt("m2")).unwrap();

        assert!(entity.mark_version_deployed(1));
        assert!(entity.snapshot(1).unwrap().deployed);
        assert!(!entity.snapshot(2).unwrap().deployed);
        assert!(!entity.mark_version_deployed(3));
        assert!(!entity.mark_version_deployed(0));
    }

    #[test]
    fn test_content_serde_is_tagged_by_kind() {
        let json = serde_json::to_value(agent(0.2)).unwrap();
        assert_eq!(json["kind"], "agent");
        assert_eq!(json["environment"], "staging");

        let parsed: EntityContent = serde_json::from_value(serde_json::json!({
            "kind": "prompt",
            "system_instruction": "Classify",
            "model": "m1"
        }))
        .unwrap();
        assert_eq!(parsed.kind(), EntityKind::Prompt);
    }
}
