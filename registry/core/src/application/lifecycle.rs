// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Lifecycle Coordinator
//!
//! Application service that owns every mutation of prompts, agents,
//! deployment records and governance policies:
//!
//! - edits commit a new immutable version through the entity's ledger
//! - deployments pin the entity's current version and flag that snapshot
//! - rollbacks move a record to its terminal state, idempotently
//! - compliance runs evaluate the current content against enabled policies
//!
//! Aggregate counts are recomputed from the repositories on every read.
//!
//! Operations are synchronous and assume a single writer; concurrent
//! multi-user access needs its own transaction layer on top.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::compliance::{ComplianceCheckResult, ComplianceEvaluator, ComplianceSummary};
use crate::domain::deployment::{DeploymentId, DeploymentRecord, Environment};
use crate::domain::entity::{EntityContent, EntityId, EntityKind, ValidationError, VersionedEntity};
use crate::domain::events::LifecycleEvent;
use crate::domain::policy::{GovernancePolicy, PolicyId};
use crate::domain::repository::{DeploymentRepository, EntityRepository, PolicyRepository, RepositoryError};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl LifecycleError {
    fn entity_not_found(id: EntityId) -> Self {
        Self::NotFound { kind: "entity", id: id.to_string() }
    }

    fn deployment_not_found(id: DeploymentId) -> Self {
        Self::NotFound { kind: "deployment", id: id.to_string() }
    }

    fn policy_not_found(id: &PolicyId) -> Self {
        Self::NotFound { kind: "policy", id: id.to_string() }
    }
}

/// Read-time aggregate over the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryCounts {
    pub prompts: usize,
    pub agents: usize,
    pub deployments: usize,
    pub live_deployments: usize,
    pub enabled_policies: usize,
}

pub trait LifecycleService: Send + Sync {
    fn create_entity(&self, name: &str, content: EntityContent) -> Result<VersionedEntity, LifecycleError>;
    fn edit_and_save(&self, id: EntityId, new_content: EntityContent) -> Result<VersionedEntity, LifecycleError>;
    fn rename_entity(&self, id: EntityId, name: &str) -> Result<VersionedEntity, LifecycleError>;
    fn delete_entity(&self, id: EntityId) -> Result<(), LifecycleError>;
    fn get_entity(&self, id: EntityId) -> Result<VersionedEntity, LifecycleError>;
    fn find_entity_by_name(&self, name: &str) -> Result<Option<VersionedEntity>, LifecycleError>;
    fn list_entities(&self, kind: Option<EntityKind>) -> Result<Vec<VersionedEntity>, LifecycleError>;

    fn deploy(&self, id: EntityId, environment: Environment) -> Result<DeploymentRecord, LifecycleError>;
    fn rollback(&self, deployment_id: DeploymentId) -> Result<DeploymentRecord, LifecycleError>;
    fn get_deployment(&self, id: DeploymentId) -> Result<DeploymentRecord, LifecycleError>;
    fn list_deployments(&self) -> Result<Vec<DeploymentRecord>, LifecycleError>;
    fn deployments_for_entity(&self, id: EntityId) -> Result<Vec<DeploymentRecord>, LifecycleError>;

    fn get_compliance_snapshot(
        &self,
        id: EntityId,
        policies: &[GovernancePolicy],
    ) -> Result<Vec<ComplianceCheckResult>, LifecycleError>;
    fn run_registered_compliance(&self, id: EntityId) -> Result<Vec<ComplianceCheckResult>, LifecycleError>;

    fn add_policy(&self, policy: GovernancePolicy) -> Result<(), LifecycleError>;
    fn set_policy_enabled(&self, id: &PolicyId, enabled: bool) -> Result<GovernancePolicy, LifecycleError>;
    fn list_policies(&self) -> Result<Vec<GovernancePolicy>, LifecycleError>;

    fn counts(&self) -> Result<RegistryCounts, LifecycleError>;
}

pub struct StandardLifecycleService {
    entities: Arc<dyn EntityRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    policies: Arc<dyn PolicyRepository>,
    evaluator: ComplianceEvaluator,
    event_bus: Arc<EventBus>,
}

impl StandardLifecycleService {
    pub fn new(
        entities: Arc<dyn EntityRepository>,
        deployments: Arc<dyn DeploymentRepository>,
        policies: Arc<dyn PolicyRepository>,
        evaluator: ComplianceEvaluator,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            entities,
            deployments,
            policies,
            evaluator,
            event_bus,
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    fn evaluate(
        &self,
        entity: &VersionedEntity,
        policies: &[GovernancePolicy],
    ) -> Vec<ComplianceCheckResult> {
        let results = self.evaluator.run(entity.content(), policies);
        let summary = ComplianceSummary::from_results(&results);

        info!(
            entity_id = %entity.id,
            version = entity.current_version(),
            passed = summary.passed,
            failed = summary.failed,
            warnings = summary.warnings,
            "Compliance evaluated"
        );
        self.event_bus.publish(LifecycleEvent::ComplianceEvaluated {
            entity_id: entity.id,
            version: entity.current_version(),
            summary,
            evaluated_at: Utc::now(),
        });

        results
    }
}

impl LifecycleService for StandardLifecycleService {
    fn create_entity(&self, name: &str, content: EntityContent) -> Result<VersionedEntity, LifecycleError> {
        let entity = VersionedEntity::create(name, content)?;
        self.entities.save(&entity)?;

        info!(entity_id = %entity.id, kind = %entity.kind, name = entity.name(), "Entity created");
        self.event_bus.publish(LifecycleEvent::EntityCreated {
            entity_id: entity.id,
            kind: entity.kind,
            name: entity.name().to_string(),
            created_at: entity.created_at,
        });

        Ok(entity)
    }

    fn edit_and_save(&self, id: EntityId, new_content: EntityContent) -> Result<VersionedEntity, LifecycleError> {
        let mut entity = self.get_entity(id)?;
        let old_version = entity.current_version();

        let committed_at = entity.commit_new_version(new_content)?.created_at;
        self.entities.save(&entity)?;

        info!(entity_id = %id, old_version, new_version = entity.current_version(), "Version committed");
        self.event_bus.publish(LifecycleEvent::VersionCommitted {
            entity_id: id,
            old_version,
            new_version: entity.current_version(),
            committed_at,
        });

        Ok(entity)
    }

    fn rename_entity(&self, id: EntityId, name: &str) -> Result<VersionedEntity, LifecycleError> {
        let mut entity = self.get_entity(id)?;
        let old_name = entity.name().to_string();

        entity.rename(name)?;
        self.entities.save(&entity)?;

        info!(entity_id = %id, old_name = %old_name, new_name = entity.name(), "Entity renamed");
        self.event_bus.publish(LifecycleEvent::EntityRenamed {
            entity_id: id,
            old_name,
            new_name: entity.name().to_string(),
            renamed_at: entity.updated_at,
        });

        Ok(entity)
    }

    fn delete_entity(&self, id: EntityId) -> Result<(), LifecycleError> {
        if !self.entities.delete(id)? {
            return Err(LifecycleError::entity_not_found(id));
        }

        info!(entity_id = %id, "Entity deleted");
        self.event_bus.publish(LifecycleEvent::EntityDeleted {
            entity_id: id,
            deleted_at: Utc::now(),
        });

        Ok(())
    }

    fn get_entity(&self, id: EntityId) -> Result<VersionedEntity, LifecycleError> {
        self.entities
            .find_by_id(id)?
            .ok_or_else(|| LifecycleError::entity_not_found(id))
    }

    fn find_entity_by_name(&self, name: &str) -> Result<Option<VersionedEntity>, LifecycleError> {
        Ok(self.entities.find_by_name(name)?)
    }

    fn list_entities(&self, kind: Option<EntityKind>) -> Result<Vec<VersionedEntity>, LifecycleError> {
        let entities = match kind {
            Some(kind) => self.entities.list_by_kind(kind)?,
            None => self.entities.list_all()?,
        };
        Ok(entities)
    }

    fn deploy(&self, id: EntityId, environment: Environment) -> Result<DeploymentRecord, LifecycleError> {
        let mut entity = self.get_entity(id)?;

        let record = DeploymentRecord::pin(&entity, environment);
        let pinned = record.entity_ref();

        // The snapshot flag is only set once a stored record references it
        self.deployments.save(&record)?;
        entity.mark_version_deployed(pinned.version);
        self.entities.save(&entity)?;

        info!(
            deployment_id = %record.id,
            entity_id = %id,
            version = pinned.version,
            environment = %environment,
            "Deployment created"
        );
        self.event_bus.publish(LifecycleEvent::DeploymentCreated {
            deployment_id: record.id,
            entity_id: id,
            version: pinned.version,
            environment,
            deployed_at: record.deployed_at,
        });

        Ok(record)
    }

    fn rollback(&self, deployment_id: DeploymentId) -> Result<DeploymentRecord, LifecycleError> {
        let mut record = self.get_deployment(deployment_id)?;

        if !record.rollback() {
            debug!(deployment_id = %deployment_id, "Deployment already rolled back");
            return Ok(record);
        }
        self.deployments.save(&record)?;

        let pinned = record.entity_ref();
        info!(deployment_id = %deployment_id, entity_id = %pinned.entity_id, version = pinned.version, "Deployment rolled back");
        self.event_bus.publish(LifecycleEvent::DeploymentRolledBack {
            deployment_id,
            entity_id: pinned.entity_id,
            version: pinned.version,
            rolled_back_at: record.rolled_back_at().unwrap_or_else(Utc::now),
        });

        Ok(record)
    }

    fn get_deployment(&self, id: DeploymentId) -> Result<DeploymentRecord, LifecycleError> {
        self.deployments
            .find_by_id(id)?
            .ok_or_else(|| LifecycleError::deployment_not_found(id))
    }

    fn list_deployments(&self) -> Result<Vec<DeploymentRecord>, LifecycleError> {
        Ok(self.deployments.list_all()?)
    }

    fn deployments_for_entity(&self, id: EntityId) -> Result<Vec<DeploymentRecord>, LifecycleError> {
        Ok(self.deployments.find_by_entity(id)?)
    }

    fn get_compliance_snapshot(
        &self,
        id: EntityId,
        policies: &[GovernancePolicy],
    ) -> Result<Vec<ComplianceCheckResult>, LifecycleError> {
        let entity = self.get_entity(id)?;
        Ok(self.evaluate(&entity, policies))
    }

    fn run_registered_compliance(&self, id: EntityId) -> Result<Vec<ComplianceCheckResult>, LifecycleError> {
        let entity = self.get_entity(id)?;
        let policies = self.policies.list_all()?;
        Ok(self.evaluate(&entity, &policies))
    }

    fn add_policy(&self, policy: GovernancePolicy) -> Result<(), LifecycleError> {
        policy.validate()?;
        if self.policies.find_by_id(&policy.id)?.is_some() {
            return Err(ValidationError::DuplicatePolicy(policy.id.0.clone()).into());
        }
        self.policies.insert(&policy)?;

        info!(policy_id = %policy.id, category = %policy.category, enabled = policy.enabled, "Policy added");
        self.event_bus.publish(LifecycleEvent::PolicyAdded {
            policy_id: policy.id,
            added_at: Utc::now(),
        });

        Ok(())
    }

    fn set_policy_enabled(&self, id: &PolicyId, enabled: bool) -> Result<GovernancePolicy, LifecycleError> {
        let mut policy = self
            .policies
            .find_by_id(id)?
            .ok_or_else(|| LifecycleError::policy_not_found(id))?;

        policy.enabled = enabled;
        self.policies.update(&policy)?;

        info!(policy_id = %id, enabled, "Policy toggled");
        self.event_bus.publish(LifecycleEvent::PolicyToggled {
            policy_id: id.clone(),
            enabled,
            toggled_at: Utc::now(),
        });

        Ok(policy)
    }

    fn list_policies(&self) -> Result<Vec<GovernancePolicy>, LifecycleError> {
        Ok(self.policies.list_all()?)
    }

    fn counts(&self) -> Result<RegistryCounts, LifecycleError> {
        let deployments = self.deployments.list_all()?;
        let policies = self.policies.list_all()?;

        Ok(RegistryCounts {
            prompts: self.entities.count_by_kind(EntityKind::Prompt)?,
            agents: self.entities.count_by_kind(EntityKind::Agent)?,
            deployments: deployments.len(),
            live_deployments: deployments.iter().filter(|d| d.is_live()).count(),
            enabled_policies: policies.iter().filter(|p| p.enabled).count(),
        })
    }
}
