//! Affected workflow and module summaries.
//!
//! These work on the flat list of a policy's direct active dependencies,
//! not on the graph.

use crate::domain::{
    DependencyId, DependencyRecord, DependencyStrength, DependentType, EntityId, RiskLevel,
};
use serde::{Deserialize, Serialize};

/// One dependent entity touched by a policy change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedEntity {
    /// The dependent entity
    pub entity_id: EntityId,

    /// Kind of entity
    pub dependent_type: DependentType,

    /// Record declaring the dependency
    pub dependency_id: DependencyId,

    /// Declared coupling
    pub strength: DependencyStrength,

    /// Risk derived from `strength`
    pub risk_level: RiskLevel,

    /// Estimated users (workflows only; an approximation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_user_count: Option<u32>,

    /// From record metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_description: Option<String>,

    /// From record metadata
    #[serde(default)]
    pub affected_sections: Vec<String>,

    /// Whether the entity updates itself
    pub automatic_update: bool,

    /// Strength-driven actions, always ending with the update mode
    pub recommended_actions: Vec<String>,
}

impl AffectedEntity {
    fn from_record(record: &DependencyRecord, affected_user_count: Option<u32>) -> Self {
        let automatic_update = record.metadata.automatic_update();
        Self {
            entity_id: record.dependent_id,
            dependent_type: record.dependent_type,
            dependency_id: record.id,
            strength: record.strength,
            risk_level: record.risk_level(),
            affected_user_count,
            impact_description: record.metadata.impact_description.clone(),
            affected_sections: record.metadata.affected_sections.clone(),
            automatic_update,
            recommended_actions: recommended_actions(record.strength, automatic_update),
        }
    }

    /// `true` when the entity's risk is high or critical.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.risk_level.is_elevated()
    }
}

/// Workflows touched by a policy change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedWorkflows {
    /// Number of affected workflows
    pub total_workflows: usize,

    /// Every affected workflow
    pub workflows: Vec<AffectedEntity>,

    /// Workflows at high or critical risk
    pub critical_workflows: Vec<AffectedEntity>,

    /// Sum of `affected_user_count`
    pub estimated_affected_users: u32,
}

impl AffectedWorkflows {
    /// Summarize the workflow records among `records`.
    #[must_use]
    pub fn from_records(records: &[DependencyRecord], users_per_workflow: u32) -> Self {
        let workflows: Vec<AffectedEntity> = records
            .iter()
            .filter(|r| r.dependent_type == DependentType::Workflow)
            .map(|r| AffectedEntity::from_record(r, Some(users_per_workflow)))
            .collect();
        let critical_workflows = workflows.iter().filter(|w| w.is_critical()).cloned().collect();
        let estimated_affected_users = workflows
            .iter()
            .filter_map(|w| w.affected_user_count)
            .fold(0u32, u32::saturating_add);

        Self {
            total_workflows: workflows.len(),
            workflows,
            critical_workflows,
            estimated_affected_users,
        }
    }
}

/// Modules touched by a policy change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedModules {
    /// Number of affected modules
    pub total_modules: usize,

    /// Every affected module
    pub modules: Vec<AffectedEntity>,

    /// Modules at high or critical risk
    pub critical_modules: Vec<AffectedEntity>,
}

impl AffectedModules {
    /// Summarize the module records among `records`.
    #[must_use]
    pub fn from_records(records: &[DependencyRecord]) -> Self {
        let modules: Vec<AffectedEntity> = records
            .iter()
            .filter(|r| r.dependent_type == DependentType::Module)
            .map(|r| AffectedEntity::from_record(r, None))
            .collect();
        let critical_modules = modules.iter().filter(|m| m.is_critical()).cloned().collect();

        Self {
            total_modules: modules.len(),
            modules,
            critical_modules,
        }
    }
}

fn recommended_actions(strength: DependencyStrength, automatic_update: bool) -> Vec<String> {
    let mut actions: Vec<String> = match strength {
        DependencyStrength::Strong => vec![
            "Test thoroughly before publishing".into(),
            "Notify all users of the change".into(),
            "Create a rollback plan".into(),
        ],
        DependencyStrength::Medium => vec![
            "Review the dependent entity for required changes".into(),
            "Notify team leads".into(),
        ],
        DependencyStrength::Weak => Vec::new(),
    };

    actions.push(if automatic_update {
        "Will auto-update".into()
    } else {
        "Manual update required".into()
    });
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyMetadata, PolicyId};
    use chrono::Utc;

    fn record(
        dependent_type: DependentType,
        strength: DependencyStrength,
        automatic_update: Option<bool>,
    ) -> DependencyRecord {
        let now = Utc::now();
        DependencyRecord {
            id: DependencyId::new(),
            policy_id: PolicyId::new(),
            dependent_type,
            dependent_id: EntityId::new(),
            strength,
            metadata: DependencyMetadata {
                automatic_update,
                ..DependencyMetadata::default()
            },
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_strong_workflow_actions() {
        let records = vec![record(DependentType::Workflow, DependencyStrength::Strong, None)];
        let summary = AffectedWorkflows::from_records(&records, 20);

        assert_eq!(summary.total_workflows, 1);
        assert_eq!(summary.critical_workflows.len(), 1);
        assert_eq!(summary.estimated_affected_users, 20);

        let workflow = &summary.workflows[0];
        assert_eq!(workflow.risk_level, RiskLevel::Critical);
        assert_eq!(workflow.affected_user_count, Some(20));
        assert_eq!(workflow.recommended_actions.len(), 4);
        assert_eq!(
            workflow.recommended_actions.last().map(String::as_str),
            Some("Manual update required")
        );
    }

    #[test]
    fn test_weak_workflow_is_not_critical() {
        let records = vec![record(DependentType::Workflow, DependencyStrength::Weak, Some(true))];
        let summary = AffectedWorkflows::from_records(&records, 20);

        assert!(summary.critical_workflows.is_empty());
        assert_eq!(summary.workflows[0].risk_level, RiskLevel::Medium);
        assert_eq!(summary.workflows[0].recommended_actions, vec!["Will auto-update"]);
    }

    #[test]
    fn test_medium_module_is_critical_without_user_count() {
        let records = vec![
            record(DependentType::Module, DependencyStrength::Medium, Some(false)),
            record(DependentType::Workflow, DependencyStrength::Strong, None),
        ];
        let summary = AffectedModules::from_records(&records);

        assert_eq!(summary.total_modules, 1);
        assert_eq!(summary.critical_modules.len(), 1);
        assert_eq!(summary.modules[0].risk_level, RiskLevel::High);
        assert_eq!(summary.modules[0].affected_user_count, None);
        assert_eq!(summary.modules[0].recommended_actions.len(), 3);
    }
}
