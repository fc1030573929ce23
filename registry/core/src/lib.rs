// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PromptOps Registry Core
//!
//! Versioned prompts and agents, governance compliance checks and
//! deployment records with rollback.
//!
//! # Architecture
//!
//! - **Domain:** aggregates, policies, events and repository contracts
//! - **Application:** the lifecycle coordinator and its composition root
//! - **Infrastructure:** in-memory repositories and the event bus

pub mod domain;
pub mod application;
pub mod infrastructure;
