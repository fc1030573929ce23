// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Registry Factory - Application Layer
//!
//! Wires repository implementations, the event bus and the compliance
//! evaluator into a `StandardLifecycleService`, then seeds it from a
//! `RegistryConfigManifest`.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Composition root for the lifecycle coordinator

use std::sync::Arc;

use tracing::info;

use crate::application::lifecycle::{LifecycleError, LifecycleService, StandardLifecycleService};
use crate::domain::compliance::ComplianceEvaluator;
use crate::domain::policy::CustomPolicyRegistry;
use crate::domain::registry_config::RegistryConfigManifest;
use crate::domain::repository::{DeploymentRepository, EntityRepository, PolicyRepository};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::repositories::{
    InMemoryDeploymentRepository, InMemoryEntityRepository, InMemoryPolicyRepository,
};

pub fn create_entity_repository() -> Arc<dyn EntityRepository> {
    Arc::new(InMemoryEntityRepository::new())
}

pub fn create_deployment_repository() -> Arc<dyn DeploymentRepository> {
    Arc::new(InMemoryDeploymentRepository::new())
}

pub fn create_policy_repository() -> Arc<dyn PolicyRepository> {
    Arc::new(InMemoryPolicyRepository::new())
}

/// Build an empty in-memory registry with no policies
pub fn create_in_memory_service(evaluators: CustomPolicyRegistry, event_bus_capacity: usize) -> StandardLifecycleService {
    StandardLifecycleService::new(
        create_entity_repository(),
        create_deployment_repository(),
        create_policy_repository(),
        ComplianceEvaluator::new(Arc::new(evaluators)),
        Arc::new(EventBus::new(event_bus_capacity)),
    )
}

/// Build an in-memory registry from a configuration manifest.
///
/// Policies are registered in declaration order, then seed prompts and seed
/// agents are created through the coordinator so that every seed is
/// validated and announced on the event bus like any other entity.
pub fn build_from_config(
    config: &RegistryConfigManifest,
    evaluators: CustomPolicyRegistry,
) -> Result<StandardLifecycleService, LifecycleError> {
    let service = create_in_memory_service(evaluators, config.spec.event_bus_capacity);

    for policy in &config.spec.policies {
        service.add_policy(policy.clone())?;
    }
    for seed in &config.spec.prompts {
        service.create_entity(&seed.name, seed.entity_content())?;
    }
    for seed in &config.spec.agents {
        service.create_entity(&seed.name, seed.entity_content())?;
    }

    info!(
        registry = %config.metadata.name,
        policies = config.spec.policies.len(),
        prompts = config.spec.prompts.len(),
        agents = config.spec.agents.len(),
        "Registry initialized"
    );

    Ok(service)
}
