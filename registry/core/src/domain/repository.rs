// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate root, following the DDD Repository
//! pattern: one repository per aggregate, interface defined in the domain layer,
//! implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `EntityRepository` | `VersionedEntity` | `InMemoryEntityRepository` |
//! | `DeploymentRepository` | `DeploymentRecord` | `InMemoryDeploymentRepository` |
//! | `PolicyRepository` | `GovernancePolicy` | `InMemoryPolicyRepository` |
//!
//! Repositories store whole aggregates. They never edit a version ledger or a
//! deployment pin themselves; those changes happen on the aggregate and are
//! written back with `save`.

use crate::domain::deployment::{DeploymentId, DeploymentRecord};
use crate::domain::entity::{EntityId, EntityKind, VersionedEntity};
use crate::domain::policy::{GovernancePolicy, PolicyId};

/// Repository interface for prompt and agent aggregates
pub trait EntityRepository: Send + Sync {
    /// Save entity (create or update)
    fn save(&self, entity: &VersionedEntity) -> Result<(), RepositoryError>;

    fn find_by_id(&self, id: EntityId) -> Result<Option<VersionedEntity>, RepositoryError>;

    /// First entity with this exact name
    fn find_by_name(&self, name: &str) -> Result<Option<VersionedEntity>, RepositoryError>;

    /// All entities, oldest first
    fn list_all(&self) -> Result<Vec<VersionedEntity>, RepositoryError>;

    /// Entities of one kind, oldest first
    fn list_by_kind(&self, kind: EntityKind) -> Result<Vec<VersionedEntity>, RepositoryError>;

    /// Number of stored entities of `kind`, read at call time
    fn count_by_kind(&self, kind: EntityKind) -> Result<usize, RepositoryError>;

    /// Delete entity by ID. Returns false if it did not exist.
    fn delete(&self, id: EntityId) -> Result<bool, RepositoryError>;
}

/// Repository interface for deployment records
pub trait DeploymentRepository: Send + Sync {
    fn save(&self, record: &DeploymentRecord) -> Result<(), RepositoryError>;

    fn find_by_id(&self, id: DeploymentId) -> Result<Option<DeploymentRecord>, RepositoryError>;

    /// Records pinned to any version of `entity_id`, newest first
    fn find_by_entity(&self, entity_id: EntityId) -> Result<Vec<DeploymentRecord>, RepositoryError>;

    /// All records, newest first
    fn list_all(&self) -> Result<Vec<DeploymentRecord>, RepositoryError>;
}

/// Repository interface for governance policies.
///
/// Listing preserves declaration (insertion) order; compliance results follow it.
pub trait PolicyRepository: Send + Sync {
    /// Insert a new policy. Fails with `Conflict` if the id is taken.
    fn insert(&self, policy: &GovernancePolicy) -> Result<(), RepositoryError>;

    /// Replace an existing policy in place, keeping its position
    fn update(&self, policy: &GovernancePolicy) -> Result<(), RepositoryError>;

    fn find_by_id(&self, id: &PolicyId) -> Result<Option<GovernancePolicy>, RepositoryError>;

    fn list_all(&self) -> Result<Vec<GovernancePolicy>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
