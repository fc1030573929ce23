// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `promptops compliance` - evaluate enabled policies against registry entities

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

use promptops_core::application::lifecycle::LifecycleService;
use promptops_core::domain::compliance::{ComplianceCheckResult, ComplianceSummary};
use promptops_core::domain::entity::VersionedEntity;
use promptops_core::domain::policy::ComplianceStatus;

use super::load_registry;

pub fn execute(config_path: Option<PathBuf>, entity_name: Option<&str>) -> Result<()> {
    let (_, service) = load_registry(config_path)?;
    let entities = select_entities(&service, entity_name)?;

    if entities.is_empty() {
        println!("{}", "No entities in the registry.".yellow());
        return Ok(());
    }

    let mut non_compliant = 0;
    for entity in &entities {
        let results = service
            .run_registered_compliance(entity.id)
            .with_context(|| format!("Failed to run compliance for '{}'", entity.name()))?;
        let summary = ComplianceSummary::from_results(&results);
        if !summary.is_compliant() {
            non_compliant += 1;
        }

        println!(
            "{} {} v{}",
            entity.kind.to_string().dimmed(),
            entity.name().bold(),
            entity.current_version()
        );
        if results.is_empty() {
            println!("  {}", "(no enabled policies)".dimmed());
        }
        for line in render_results(&results) {
            println!("  {}", line);
        }
        println!(
            "  {} passed, {} failed, {} warnings",
            summary.passed, summary.failed, summary.warnings
        );
        println!();
    }

    if non_compliant == 0 {
        println!("{}", "✓ All entities are compliant".green());
    } else {
        println!(
            "{}",
            format!("✗ {} of {} entities failed a policy", non_compliant, entities.len()).red()
        );
    }

    Ok(())
}

fn select_entities(service: &dyn LifecycleService, entity_name: Option<&str>) -> Result<Vec<VersionedEntity>> {
    match entity_name {
        Some(name) => {
            let entity = service
                .find_entity_by_name(name)?
                .with_context(|| format!("No entity named '{}'", name))?;
            Ok(vec![entity])
        }
        None => Ok(service.list_entities(None)?),
    }
}

fn status_label(status: ComplianceStatus) -> ColoredString {
    match status {
        ComplianceStatus::Pass => status.to_string().green(),
        ComplianceStatus::Fail => status.to_string().red().bold(),
        ComplianceStatus::Warning => status.to_string().yellow(),
    }
}

/// One line per result, in evaluation order
pub fn render_results(results: &[ComplianceCheckResult]) -> Vec<String> {
    results
        .iter()
        .map(|r| {
            format!(
                "{} {} [{}] {}",
                status_label(r.status),
                r.policy_name,
                r.category,
                r.details.dimmed()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptops_core::application::registry_factory::create_in_memory_service;
    use promptops_core::domain::entity::{EntityContent, PromptContent};
    use promptops_core::domain::policy::{CustomPolicyRegistry, PolicyCategory};

    #[test]
    fn test_render_keeps_order() {
        colored::control::set_override(false);
        let results = vec![
            ComplianceCheckResult {
                policy_id: "b".into(),
                policy_name: "Second".to_string(),
                category: PolicyCategory::Security,
                status: ComplianceStatus::Fail,
                details: "matched".to_string(),
            },
            ComplianceCheckResult {
                policy_id: "a".into(),
                policy_name: "First".to_string(),
                category: PolicyCategory::Fairness,
                status: ComplianceStatus::Pass,
                details: "clean".to_string(),
            },
        ];

        let lines = render_results(&results);
        assert_eq!(lines[0], "FAIL Second [security] matched");
        assert_eq!(lines[1], "PASS First [fairness] clean");
    }

    #[test]
    fn test_select_unknown_entity_fails() {
        let service = create_in_memory_service(CustomPolicyRegistry::new(), 8);
        service
            .create_entity(
                "Summarizer",
                EntityContent::Prompt(PromptContent {
                    system_instruction: "Summarize".to_string(),
                    user_template: String::new(),
                    model: "m1".to_string(),
                }),
            )
            .unwrap();

        assert_eq!(select_entities(&service, None).unwrap().len(), 1);
        assert_eq!(select_entities(&service, Some("Summarizer")).unwrap().len(), 1);
        assert!(select_entities(&service, Some("Missing")).is_err());
    }
}
