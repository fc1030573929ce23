// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::compliance::ComplianceSummary;
use crate::domain::deployment::{DeploymentId, Environment};
use crate::domain::entity::{EntityId, EntityKind};
use crate::domain::policy::PolicyId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    EntityCreated {
        entity_id: EntityId,
        kind: EntityKind,
        name: String,
        created_at: DateTime<Utc>,
    },
    VersionCommitted {
        entity_id: EntityId,
        old_version: u32,
        new_version: u32,
        committed_at: DateTime<Utc>,
    },
    EntityRenamed {
        entity_id: EntityId,
        old_name: String,
        new_name: String,
        renamed_at: DateTime<Utc>,
    },
    EntityDeleted {
        entity_id: EntityId,
        deleted_at: DateTime<Utc>,
    },
    DeploymentCreated {
        deployment_id: DeploymentId,
        entity_id: EntityId,
        version: u32,
        environment: Environment,
        deployed_at: DateTime<Utc>,
    },
    DeploymentRolledBack {
        deployment_id: DeploymentId,
        entity_id: EntityId,
        version: u32,
        rolled_back_at: DateTime<Utc>,
    },
    ComplianceEvaluated {
        entity_id: EntityId,
        version: u32,
        summary: ComplianceSummary,
        evaluated_at: DateTime<Utc>,
    },
    PolicyAdded {
        policy_id: PolicyId,
        added_at: DateTime<Utc>,
    },
    PolicyToggled {
        policy_id: PolicyId,
        enabled: bool,
        toggled_at: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    /// Entity the event concerns, if any
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            LifecycleEvent::EntityCreated { entity_id, .. }
            | LifecycleEvent::VersionCommitted { entity_id, .. }
            | LifecycleEvent::EntityRenamed { entity_id, .. }
            | LifecycleEvent::EntityDeleted { entity_id, .. }
            | LifecycleEvent::DeploymentCreated { entity_id, .. }
            | LifecycleEvent::DeploymentRolledBack { entity_id, .. }
            | LifecycleEvent::ComplianceEvaluated { entity_id, .. } => Some(*entity_id),
            LifecycleEvent::PolicyAdded { .. } | LifecycleEvent::PolicyToggled { .. } => None,
        }
    }
}
