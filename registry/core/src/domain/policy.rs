// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance Policies
//!
//! A [`GovernancePolicy`] is plain data: its rule is a [`PolicyKind`] variant
//! rather than an embedded closure, so policy sets can be loaded from YAML and
//! serialized back. Rules that cannot be expressed as data are registered as
//! [`PolicyEvaluator`] strategies in a [`CustomPolicyRegistry`] and referenced
//! by `PolicyKind::Custom { id }`.
//!
//! Evaluation is a pure function of the entity content. It may fail with a
//! [`PolicyEvaluationError`]; the compliance evaluator contains such failures.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::{EntityContent, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub String);

impl PolicyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PolicyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCategory {
    ContentSafety,
    DataPrivacy,
    Fairness,
    Security,
    Regulatory,
}

impl fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyCategory::ContentSafety => write!(f, "content_safety"),
            PolicyCategory::DataPrivacy => write!(f, "data_privacy"),
            PolicyCategory::Fairness => write!(f, "fairness"),
            PolicyCategory::Security => write!(f, "security"),
            PolicyCategory::Regulatory => write!(f, "regulatory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Pass,
    Fail,
    Warning,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Pass => write!(f, "PASS"),
            ComplianceStatus::Fail => write!(f, "FAIL"),
            ComplianceStatus::Warning => write!(f, "WARN"),
        }
    }
}

/// Verdict a matching rule produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Fail,
    Warning,
}

impl From<Severity> for ComplianceStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Fail => ComplianceStatus::Fail,
            Severity::Warning => ComplianceStatus::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyKind {
    /// Flags content containing any keyword (case-insensitive)
    KeywordBlock {
        keywords: Vec<String>,
        #[serde(default)]
        severity: Severity,
    },
    /// Flags content matching a regular expression
    PatternMatch {
        pattern: String,
        #[serde(default)]
        severity: Severity,
    },
    /// Warns when the inspected text is longer than `max_chars`
    MaxLength { max_chars: usize },
    /// Delegates to an evaluator registered under `id`
    Custom { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    pub status: ComplianceStatus,
    pub details: String,
}

impl PolicyOutcome {
    pub fn pass(details: impl Into<String>) -> Self {
        Self { status: ComplianceStatus::Pass, details: details.into() }
    }

    pub fn fail(details: impl Into<String>) -> Self {
        Self { status: ComplianceStatus::Fail, details: details.into() }
    }

    pub fn warning(details: impl Into<String>) -> Self {
        Self { status: ComplianceStatus::Warning, details: details.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyEvaluationError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("no evaluator registered for custom policy '{0}'")]
    UnknownEvaluator(String),

    #[error("evaluator failed: {0}")]
    Evaluator(String),
}

/// Strategy behind `PolicyKind::Custom`
pub trait PolicyEvaluator: Send + Sync {
    fn evaluate(&self, content: &EntityContent) -> Result<PolicyOutcome, PolicyEvaluationError>;
}

impl<F> PolicyEvaluator for F
where
    F: Fn(&EntityContent) -> Result<PolicyOutcome, PolicyEvaluationError> + Send + Sync,
{
    fn evaluate(&self, content: &EntityContent) -> Result<PolicyOutcome, PolicyEvaluationError> {
        self(content)
    }
}

#[derive(Clone, Default)]
pub struct CustomPolicyRegistry {
    evaluators: HashMap<String, Arc<dyn PolicyEvaluator>>,
}

impl CustomPolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the evaluator for `id`
    pub fn register(&mut self, id: impl Into<String>, evaluator: Arc<dyn PolicyEvaluator>) {
        self.evaluators.insert(id.into(), evaluator);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn PolicyEvaluator>> {
        self.evaluators.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.evaluators.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl fmt::Debug for CustomPolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.evaluators.keys().collect();
        ids.sort();
        f.debug_struct("CustomPolicyRegistry").field("evaluators", &ids).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernancePolicy {
    pub id: PolicyId,
    pub name: String,
    pub category: PolicyCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub kind: PolicyKind,
}

fn default_true() -> bool {
    true
}

impl GovernancePolicy {
    /// New enabled policy with an empty description
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: PolicyCategory, kind: PolicyKind) -> Self {
        Self {
            id: PolicyId::new(id),
            name: name.into(),
            category,
            description: String::new(),
            enabled: true,
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.0.trim().is_empty() {
            return Err(ValidationError::EmptyPolicyId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Inspect `content`. Never mutates the content or the policy.
    pub fn evaluate(
        &self,
        content: &EntityContent,
        evaluators: &CustomPolicyRegistry,
    ) -> Result<PolicyOutcome, PolicyEvaluationError> {
        match &self.kind {
            PolicyKind::KeywordBlock { keywords, severity } => {
                let text = content.inspected_text().to_lowercase();
                let found: Vec<&str> = keywords
                    .iter()
                    .map(|k| k.trim())
                    .filter(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
                    .collect();

                if found.is_empty() {
                    Ok(PolicyOutcome::pass("No blocked keywords found"))
                } else {
                    Ok(PolicyOutcome {
                        status: (*severity).into(),
                        details: format!("Blocked keywords found: {}", found.join(", ")),
                    })
                }
            }
            PolicyKind::PatternMatch { pattern, severity } => {
                let regex = Regex::new(pattern).map_err(|e| PolicyEvaluationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
                let text = content.inspected_text();
                let matches = regex.find_iter(&text).count();

                if matches == 0 {
                    Ok(PolicyOutcome::pass(format!("No matches for pattern '{}'", pattern)))
                } else {
                    Ok(PolicyOutcome {
                        status: (*severity).into(),
                        details: format!("{} match(es) for pattern '{}'", matches, pattern),
                    })
                }
            }
            PolicyKind::MaxLength { max_chars } => {
                let length = content.inspected_text().chars().count();
                if length > *max_chars {
                    Ok(PolicyOutcome::warning(format!(
                        "Content is {} characters, limit is {}",
                        length, max_chars
                    )))
                } else {
                    Ok(PolicyOutcome::pass(format!("Content is {} characters", length)))
                }
            }
            PolicyKind::Custom { id } => evaluators
                .get(id)
                .ok_or_else(|| PolicyEvaluationError::UnknownEvaluator(id.clone()))?
                .evaluate(content),
        }
    }
}
