// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod lifecycle;
pub mod registry_factory;

// Re-export the coordinator for convenience
pub use lifecycle::{LifecycleError, LifecycleService, RegistryCounts, StandardLifecycleService};
