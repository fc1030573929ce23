// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod entity;
pub mod deployment;
pub mod policy;
pub mod compliance;
pub mod events;
pub mod repository;
pub mod registry_config;
