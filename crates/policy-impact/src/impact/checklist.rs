//! Pre-publish checklist and notification suggestions.
//!
//! Both are deterministic rule lists driven by the risk assessment and the
//! affected-entity summaries.

use super::affected::{AffectedModules, AffectedWorkflows};
use super::risk::RiskAssessment;
use crate::domain::RiskLevel;
use serde::{Deserialize, Serialize};

/// Risk score above which a rollback plan and scheduled notifications are required.
pub const ROLLBACK_SCORE_THRESHOLD: u32 = 50;

/// Risk score above which the compliance team should be told.
pub const COMPLIANCE_NOTIFY_THRESHOLD: u32 = 30;

/// One step to complete before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Stable slug
    pub id: String,

    /// What to do
    pub description: String,

    /// Publishing is blocked until required items are done
    pub required: bool,

    /// Always `false` when generated
    pub completed: bool,
}

impl ChecklistItem {
    fn new(id: &str, description: impl Into<String>, required: bool) -> Self {
        Self {
            id: id.to_string(),
            description: description.into(),
            required,
            completed: false,
        }
    }
}

/// Who should hear about the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAudience {
    /// Everyone in the organization
    AllStaff,
    /// Owners of affected workflows
    WorkflowOwners,
    /// Administrators of affected modules
    ModuleAdministrators,
    /// Compliance team
    ComplianceTeam,
}

/// Urgency of a suggested notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational
    Low,
    /// Should be read before publish
    Medium,
    /// Must be read before publish
    High,
}

/// A notification the publisher should send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSuggestion {
    /// Recipients
    pub audience: NotificationAudience,

    /// Urgency
    pub priority: NotificationPriority,

    /// Why this notification is suggested
    pub reason: String,
}

/// Build the pre-publish checklist.
///
/// Two required items always lead and two optional items always close the
/// list; conditional required items sit in between.
#[must_use]
pub fn pre_publish_checklist(
    risk: &RiskAssessment,
    workflows: &AffectedWorkflows,
    modules: &AffectedModules,
) -> Vec<ChecklistItem> {
    let mut items = vec![
        ChecklistItem::new("review-changes", "Review all policy changes", true),
        ChecklistItem::new("regulatory-compliance", "Verify regulatory compliance", true),
    ];

    if risk.requires_approval {
        items.push(ChecklistItem::new(
            "obtain-approval",
            format!(
                "Obtain approval for a {} risk change",
                risk.risk_level.as_str()
            ),
            true,
        ));
    }
    if !workflows.critical_workflows.is_empty() {
        items.push(ChecklistItem::new(
            "test-critical-workflows",
            format!(
                "Test {} critical workflows against the new policy",
                workflows.critical_workflows.len()
            ),
            true,
        ));
    }
    if !modules.critical_modules.is_empty() {
        items.push(ChecklistItem::new(
            "verify-critical-modules",
            format!(
                "Verify {} critical modules against the new policy",
                modules.critical_modules.len()
            ),
            true,
        ));
    }
    if risk.overall_risk_score > ROLLBACK_SCORE_THRESHOLD {
        items.push(ChecklistItem::new(
            "rollback-plan",
            "Prepare a rollback plan",
            true,
        ));
        items.push(ChecklistItem::new(
            "schedule-notifications",
            "Schedule stakeholder notifications",
            true,
        ));
    }

    items.push(ChecklistItem::new(
        "update-training",
        "Update related training materials",
        false,
    ));
    items.push(ChecklistItem::new(
        "schedule-review",
        "Schedule a post-publish review",
        false,
    ));

    items
}

/// Suggest who to notify, one suggestion per matching rule.
#[must_use]
pub fn suggested_notifications(
    risk: &RiskAssessment,
    workflows: &AffectedWorkflows,
    modules: &AffectedModules,
) -> Vec<NotificationSuggestion> {
    let mut suggestions = Vec::new();

    if risk.risk_level == RiskLevel::Critical {
        suggestions.push(NotificationSuggestion {
            audience: NotificationAudience::AllStaff,
            priority: NotificationPriority::High,
            reason: "Critical risk policy change".to_string(),
        });
    }
    if !workflows.critical_workflows.is_empty() {
        suggestions.push(NotificationSuggestion {
            audience: NotificationAudience::WorkflowOwners,
            priority: NotificationPriority::High,
            reason: format!(
                "{} critical workflows depend on this policy",
                workflows.critical_workflows.len()
            ),
        });
    }
    if !modules.critical_modules.is_empty() {
        suggestions.push(NotificationSuggestion {
            audience: NotificationAudience::ModuleAdministrators,
            priority: NotificationPriority::Medium,
            reason: format!(
                "{} critical modules depend on this policy",
                modules.critical_modules.len()
            ),
        });
    }
    if risk.overall_risk_score > COMPLIANCE_NOTIFY_THRESHOLD {
        suggestions.push(NotificationSuggestion {
            audience: NotificationAudience::ComplianceTeam,
            priority: NotificationPriority::Medium,
            reason: format!("Risk score {} requires review", risk.overall_risk_score),
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::risk::RiskFactors;

    fn assessment(score_factors: RiskFactors) -> RiskAssessment {
        RiskAssessment::from_factors(score_factors, true)
    }

    #[test]
    fn test_minimal_checklist() {
        let risk = assessment(RiskFactors::default());
        let items = pre_publish_checklist(
            &risk,
            &AffectedWorkflows::default(),
            &AffectedModules::default(),
        );

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "review-changes",
                "regulatory-compliance",
                "update-training",
                "schedule-review"
            ]
        );
        assert!(items[0].required && items[1].required);
        assert!(!items[2].required && !items[3].required);
        assert!(items.iter().all(|i| !i.completed));
    }

    #[test]
    fn test_score_above_fifty_adds_rollback_without_approval() {
        // 30 + 20 + 0 + 6 + 0 = 56 -> medium, above the rollback threshold
        let risk = assessment(RiskFactors {
            strong_dependency_count: 3,
            total_dependencies: 10,
            critical_workflow_count: 0,
            impact_radius: 4,
            estimated_user_impact: 0,
        });
        assert_eq!(risk.overall_risk_score, 56);
        assert!(!risk.requires_approval);

        let items = pre_publish_checklist(
            &risk,
            &AffectedWorkflows::default(),
            &AffectedModules::default(),
        );
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert!(ids.contains(&"rollback-plan"));
        assert!(ids.contains(&"schedule-notifications"));
        assert!(!ids.contains(&"obtain-approval"));
    }

    #[test]
    fn test_quiet_change_has_no_notifications() {
        let risk = assessment(RiskFactors::default());
        let suggestions = suggested_notifications(
            &risk,
            &AffectedWorkflows::default(),
            &AffectedModules::default(),
        );
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_critical_change_notifies_everyone_first() {
        let risk = assessment(RiskFactors {
            strong_dependency_count: 5,
            total_dependencies: 10,
            critical_workflow_count: 5,
            impact_radius: 10,
            estimated_user_impact: 100,
        });
        assert_eq!(risk.risk_level, RiskLevel::Critical);

        let suggestions = suggested_notifications(
            &risk,
            &AffectedWorkflows::default(),
            &AffectedModules::default(),
        );
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].audience, NotificationAudience::AllStaff);
        assert_eq!(suggestions[0].priority, NotificationPriority::High);
        assert_eq!(suggestions[1].audience, NotificationAudience::ComplianceTeam);
    }
}
