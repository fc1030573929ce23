// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! This module provides infrastructure implementations of repository abstractions
//! defined in the domain layer, following the Repository pattern from DDD.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve domain aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! Lightweight in-memory implementations, shareable behind `Arc`:
//! - **InMemoryEntityRepository** - HashMap-backed prompt/agent storage
//! - **InMemoryDeploymentRepository** - HashMap-backed deployment records
//! - **InMemoryPolicyRepository** - Vec-backed policies in declaration order
//!
//! # Usage
//!
//! ```
//! use promptops_core::domain::repository::EntityRepository;
//! use promptops_core::infrastructure::repositories::InMemoryEntityRepository;
//!
//! let repo = InMemoryEntityRepository::new();
//! assert!(repo.list_all().unwrap().is_empty());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::deployment::{DeploymentId, DeploymentRecord};
use crate::domain::entity::{EntityId, EntityKind, VersionedEntity};
use crate::domain::policy::{GovernancePolicy, PolicyId};
use crate::domain::repository::{DeploymentRepository, EntityRepository, PolicyRepository, RepositoryError};

#[derive(Clone, Default)]
pub struct InMemoryEntityRepository {
    entities: Arc<RwLock<HashMap<EntityId, VersionedEntity>>>,
}

impl InMemoryEntityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut entities: Vec<VersionedEntity>) -> Vec<VersionedEntity> {
        entities.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        entities
    }
}

impl EntityRepository for InMemoryEntityRepository {
    fn save(&self, entity: &VersionedEntity) -> Result<(), RepositoryError> {
        self.entities.write().insert(entity.id, entity.clone());
        Ok(())
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<VersionedEntity>, RepositoryError> {
        Ok(self.entities.read().get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<VersionedEntity>, RepositoryError> {
        let matching = self
            .entities
            .read()
            .values()
            .filter(|e| e.name() == name)
            .cloned()
            .collect();
        Ok(Self::sorted(matching).into_iter().next())
    }

    fn list_all(&self) -> Result<Vec<VersionedEntity>, RepositoryError> {
        Ok(Self::sorted(self.entities.read().values().cloned().collect()))
    }

    fn list_by_kind(&self, kind: EntityKind) -> Result<Vec<VersionedEntity>, RepositoryError> {
        let matching = self
            .entities
            .read()
            .values()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    fn count_by_kind(&self, kind: EntityKind) -> Result<usize, RepositoryError> {
        Ok(self.entities.read().values().filter(|e| e.kind == kind).count())
    }

    fn delete(&self, id: EntityId) -> Result<bool, RepositoryError> {
        Ok(self.entities.write().remove(&id).is_some())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryDeploymentRepository {
    records: Arc<RwLock<HashMap<DeploymentId, DeploymentRecord>>>,
}

impl InMemoryDeploymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut records: Vec<DeploymentRecord>) -> Vec<DeploymentRecord> {
        records.sort_by(|a, b| b.deployed_at.cmp(&a.deployed_at).then_with(|| a.id.0.cmp(&b.id.0)));
        records
    }
}

impl DeploymentRepository for InMemoryDeploymentRepository {
    fn save(&self, record: &DeploymentRecord) -> Result<(), RepositoryError> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    fn find_by_id(&self, id: DeploymentId) -> Result<Option<DeploymentRecord>, RepositoryError> {
        Ok(self.records.read().get(&id).cloned())
    }

    fn find_by_entity(&self, entity_id: EntityId) -> Result<Vec<DeploymentRecord>, RepositoryError> {
        let matching = self
            .records
            .read()
            .values()
            .filter(|r| r.entity_ref().entity_id == entity_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(matching))
    }

    fn list_all(&self) -> Result<Vec<DeploymentRecord>, RepositoryError> {
        Ok(Self::newest_first(self.records.read().values().cloned().collect()))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPolicyRepository {
    policies: Arc<RwLock<Vec<GovernancePolicy>>>,
}

impl InMemoryPolicyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyRepository for InMemoryPolicyRepository {
    fn insert(&self, policy: &GovernancePolicy) -> Result<(), RepositoryError> {
        let mut policies = self.policies.write();
        if policies.iter().any(|p| p.id == policy.id) {
            return Err(RepositoryError::Conflict(format!("policy '{}' already exists", policy.id)));
        }
        policies.push(policy.clone());
        Ok(())
    }

    fn update(&self, policy: &GovernancePolicy) -> Result<(), RepositoryError> {
        let mut policies = self.policies.write();
        match policies.iter_mut().find(|p| p.id == policy.id) {
            Some(existing) => {
                *existing = policy.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("policy '{}'", policy.id))),
        }
    }

    fn find_by_id(&self, id: &PolicyId) -> Result<Option<GovernancePolicy>, RepositoryError> {
        Ok(self.policies.read().iter().find(|p| &p.id == id).cloned())
    }

    fn list_all(&self) -> Result<Vec<GovernancePolicy>, RepositoryError> {
        Ok(self.policies.read().clone())
    }
}
