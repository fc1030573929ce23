// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Deployment Records
//!
//! A [`DeploymentRecord`] states that one pinned version of a prompt or agent
//! was promoted to an environment. The pin is copied at creation and never
//! re-read from the live entity, so later edits cannot change what a record
//! describes.
//!
//! ## Status Machine
//!
//! ```text
//! Monitoring ─┐
//! Active ─────┼──▶ RolledBack (terminal)
//! Degraded ───┘
//! ```
//!
//! Movement among the non-terminal states belongs to external monitoring and
//! is not modelled here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::{EntityId, EntityKind, VersionedEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(pub Uuid);

impl DeploymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for DeploymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Active,
    Monitoring,
    Degraded,
    RolledBack,
}

impl DeploymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStatus::RolledBack)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Active => write!(f, "active"),
            DeploymentStatus::Monitoring => write!(f, "monitoring"),
            DeploymentStatus::Degraded => write!(f, "degraded"),
            DeploymentStatus::RolledBack => write!(f, "rolled_back"),
        }
    }
}

/// Pinned reference to one version of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: DeploymentId,
    entity_ref: EntityRef,
    pub environment: Environment,
    status: DeploymentStatus,
    pub deployed_at: DateTime<Utc>,
    rolled_back_at: Option<DateTime<Utc>>,
}

impl DeploymentRecord {
    /// Pin the entity's current version. Records start in `Monitoring`.
    pub(crate) fn pin(entity: &VersionedEntity, environment: Environment) -> Self {
        Self {
            id: DeploymentId::new(),
            entity_ref: EntityRef {
                kind: entity.kind,
                entity_id: entity.id,
                version: entity.current_version(),
            },
            environment,
            status: DeploymentStatus::Monitoring,
            deployed_at: Utc::now(),
            rolled_back_at: None,
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        self.entity_ref
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    pub fn rolled_back_at(&self) -> Option<DateTime<Utc>> {
        self.rolled_back_at
    }

    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Move to `RolledBack`. Returns false when the record was already there.
    pub fn rollback(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = DeploymentStatus::RolledBack;
        self.rolled_back_at = Some(Utc::now());
        true
    }
}
