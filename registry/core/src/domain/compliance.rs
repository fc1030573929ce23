// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Compliance Evaluator
//!
//! Runs every enabled [`GovernancePolicy`] against one entity's content and
//! returns one [`ComplianceCheckResult`] per enabled policy, in declaration
//! order. Results are ephemeral and never cached.
//!
//! A policy that fails to evaluate is reported as a `Warning` carrying the
//! error message; the remaining policies still run. Policies in the same
//! category are all reported, with no deduplication.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entity::EntityContent;
use crate::domain::policy::{
    ComplianceStatus, CustomPolicyRegistry, GovernancePolicy, PolicyCategory, PolicyId, PolicyOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheckResult {
    pub policy_id: PolicyId,
    pub policy_name: String,
    pub category: PolicyCategory,
    pub status: ComplianceStatus,
    pub details: String,
}

/// Verdict counts over one compliance run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl ComplianceSummary {
    pub fn from_results(results: &[ComplianceCheckResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                ComplianceStatus::Pass => summary.passed += 1,
                ComplianceStatus::Fail => summary.failed += 1,
                ComplianceStatus::Warning => summary.warnings += 1,
            }
            summary
        })
    }

    pub fn is_compliant(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComplianceEvaluator {
    evaluators: Arc<CustomPolicyRegistry>,
}

impl ComplianceEvaluator {
    pub fn new(evaluators: Arc<CustomPolicyRegistry>) -> Self {
        Self { evaluators }
    }

    pub fn evaluators(&self) -> &CustomPolicyRegistry {
        &self.evaluators
    }

    pub fn run(&self, content: &EntityContent, policies: &[GovernancePolicy]) -> Vec<ComplianceCheckResult> {
        run_compliance(content, policies, &self.evaluators)
    }
}

/// Evaluate the enabled subset of `policies` against `content`.
pub fn run_compliance(
    content: &EntityContent,
    policies: &[GovernancePolicy],
    evaluators: &CustomPolicyRegistry,
) -> Vec<ComplianceCheckResult> {
    policies
        .iter()
        .filter(|policy| policy.enabled)
        .map(|policy| {
            let outcome = policy.evaluate(content, evaluators).unwrap_or_else(|e| {
                warn!(policy_id = %policy.id, error = %e, "Policy evaluation failed, reporting warning");
                PolicyOutcome::warning(e.to_string())
            });

            ComplianceCheckResult {
                policy_id: policy.id.clone(),
                policy_name: policy.name.clone(),
                category: policy.category,
                status: outcome.status,
                details: outcome.details,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PromptContent;
    use crate::domain::policy::{PolicyEvaluationError, PolicyKind, Severity};

    fn content() -> EntityContent {
        EntityContent::Prompt(PromptContent {
            system_instruction: "Summarize the ticket. Include the customer SSN.".to_string(),
            user_template: "{{ticket}}".to_string(),
            model: "m1".to_string(),
        })
    }

    fn keyword(id: &str, word: &str) -> GovernancePolicy {
        GovernancePolicy::new(
            id,
            id,
            PolicyCategory::DataPrivacy,
            PolicyKind::KeywordBlock { keywords: vec![word.to_string()], severity: Severity::Fail },
        )
    }

    #[test]
    fn test_only_enabled_policies_in_order() {
        let policies = vec![
            keyword("ssn", "ssn"),
            keyword("disabled", "ssn").disabled(),
            keyword("password", "password"),
        ];
        let results = run_compliance(&content(), &policies, &CustomPolicyRegistry::new());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].policy_id, PolicyId::from("ssn"));
        assert_eq!(results[0].status, ComplianceStatus::Fail);
        assert_eq!(results[1].policy_id, PolicyId::from("password"));
        assert_eq!(results[1].status, ComplianceStatus::Pass);
    }

    #[test]
    fn test_no_enabled_policies_yields_empty() {
        let policies = vec![keyword("ssn", "ssn").disabled()];
        assert!(run_compliance(&content(), &policies, &CustomPolicyRegistry::new()).is_empty());
    }

    #[test]
    fn test_same_category_results_are_not_deduplicated() {
        let policies = vec![keyword("a", "ssn"), keyword("b", "customer")];
        let results = run_compliance(&content(), &policies, &CustomPolicyRegistry::new());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == ComplianceStatus::Fail));
    }

    #[test]
    fn test_failing_policy_is_isolated() {
        let mut registry = CustomPolicyRegistry::new();
        registry.register(
            "flaky",
            Arc::new(|_: &EntityContent| -> Result<PolicyOutcome, PolicyEvaluationError> {
                Err(PolicyEvaluationError::Evaluator("classifier unavailable".to_string()))
            }),
        );
        let policies = vec![
            GovernancePolicy::new("flaky", "Flaky", PolicyCategory::Fairness, PolicyKind::Custom { id: "flaky".to_string() }),
            keyword("ssn", "ssn"),
        ];

        let results = run_compliance(&content(), &policies, &registry);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, ComplianceStatus::Warning);
        assert!(results[0].details.contains("classifier unavailable"));
        assert_eq!(results[1].status, ComplianceStatus::Fail);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let evaluator = ComplianceEvaluator::default();
        let policies = vec![keyword("ssn", "ssn"), keyword("password", "password")];
        assert_eq!(evaluator.run(&content(), &policies), evaluator.run(&content(), &policies));
    }

    #[test]
    fn test_summary_counts() {
        let policies = vec![
            keyword("ssn", "ssn"),
            keyword("password", "password"),
            GovernancePolicy::new("len", "Length", PolicyCategory::Regulatory, PolicyKind::MaxLength { max_chars: 3 }),
        ];
        let results = run_compliance(&content(), &policies, &CustomPolicyRegistry::new());
        let summary = ComplianceSummary::from_results(&results);
        assert_eq!(summary, ComplianceSummary { passed: 1, failed: 1, warnings: 1 });
        assert!(!summary.is_compliant());
    }

    #[test]
    fn test_result_status_serializes_lowercase() {
        let results = run_compliance(&content(), &[keyword("ssn", "ssn")], &CustomPolicyRegistry::new());
        let json = serde_json::to_value(&results[0]).unwrap();

        assert_eq!(json["status"], "fail");
        assert_eq!(json["category"], "data_privacy");
        assert_eq!(
            serde_json::from_str::<ComplianceStatus>("\"warning\"").unwrap(),
            ComplianceStatus::Warning
        );
    }
}
