//! Global risk scoring for a prospective policy change.
//!
//! The score is the sum of five independently capped terms:
//!
//! | Term | Formula | Cap |
//! |---|---|---|
//! | strong dependencies | `strong * 10` | 30 |
//! | total dependencies | `total * 2` | 20 |
//! | critical workflows | `workflows * 5` | 25 |
//! | impact radius | `radius * 1.5` | 15 |
//! | user impact | `users / 10` | 10 |
//!
//! The sum is rounded to the nearest integer. Thresholds: `>= 80` critical,
//! `>= 60` high, `>= 30` medium, otherwise low. Consumers depend on these
//! exact numbers, so none of them are configurable.

use crate::domain::RiskLevel;
use serde::{Deserialize, Serialize};

/// Scores at or above this are `Critical`.
pub const CRITICAL_THRESHOLD: u32 = 80;

/// Scores at or above this are `High`.
pub const HIGH_THRESHOLD: u32 = 60;

/// Scores at or above this are `Medium`.
pub const MEDIUM_THRESHOLD: u32 = 30;

/// Largest possible score.
pub const MAX_RISK_SCORE: u32 = 100;

const STRONG_WEIGHT: f64 = 10.0;
const STRONG_CAP: f64 = 30.0;
const TOTAL_WEIGHT: f64 = 2.0;
const TOTAL_CAP: f64 = 20.0;
const WORKFLOW_WEIGHT: f64 = 5.0;
const WORKFLOW_CAP: f64 = 25.0;
const RADIUS_WEIGHT: f64 = 1.5;
const RADIUS_CAP: f64 = 15.0;
const USER_DIVISOR: f64 = 10.0;
const USER_CAP: f64 = 10.0;

/// Categorize a score.
#[must_use]
pub fn risk_level_for_score(score: u32) -> RiskLevel {
    if score >= CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if score >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Inputs to the global risk formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    /// Active strong dependencies of the policy
    pub strong_dependency_count: u32,

    /// Active dependencies of the policy
    pub total_dependencies: u32,

    /// Active dependencies that are strong workflows
    pub critical_workflow_count: u32,

    /// Impact radius from the change scope (0-10)
    pub impact_radius: u32,

    /// `critical_workflow_count * users_per_workflow`
    pub estimated_user_impact: u32,
}

impl RiskFactors {
    /// Apply the capped formula; always within `0..=100`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn score(&self) -> u32 {
        let strong = (f64::from(self.strong_dependency_count) * STRONG_WEIGHT).min(STRONG_CAP);
        let total = (f64::from(self.total_dependencies) * TOTAL_WEIGHT).min(TOTAL_CAP);
        let workflows = (f64::from(self.critical_workflow_count) * WORKFLOW_WEIGHT).min(WORKFLOW_CAP);
        let radius = (f64::from(self.impact_radius) * RADIUS_WEIGHT).min(RADIUS_CAP);
        let users = (f64::from(self.estimated_user_impact) / USER_DIVISOR).min(USER_CAP);

        let sum = (strong + total + workflows + radius + users).round();
        (sum.clamp(0.0, f64::from(MAX_RISK_SCORE))) as u32
    }
}

/// Overall risk of changing a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Score in `0..=100`
    pub overall_risk_score: u32,

    /// Category of the score
    pub risk_level: RiskLevel,

    /// Formula inputs
    pub risk_factors: RiskFactors,

    /// `true` for high and critical risk
    pub requires_approval: bool,

    /// Deterministic advice, in rule order
    pub mitigation_recommendations: Vec<String>,
}

impl RiskAssessment {
    /// Score `factors` and derive level, approval and recommendations.
    ///
    /// `is_localized` comes from the change scope and only affects the
    /// recommendation list.
    #[must_use]
    pub fn from_factors(factors: RiskFactors, is_localized: bool) -> Self {
        let overall_risk_score = factors.score();
        let risk_level = risk_level_for_score(overall_risk_score);
        let requires_approval = risk_level.is_elevated();

        Self {
            overall_risk_score,
            risk_level,
            risk_factors: factors,
            requires_approval,
            mitigation_recommendations: mitigation_recommendations(
                &factors,
                is_localized,
                requires_approval,
            ),
        }
    }
}

fn mitigation_recommendations(
    factors: &RiskFactors,
    is_localized: bool,
    requires_approval: bool,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if factors.strong_dependency_count > 0 {
        recommendations.push(format!(
            "Review {} critical dependencies before publishing",
            factors.strong_dependency_count
        ));
    }
    if factors.critical_workflow_count > 0 {
        recommendations.push(format!(
            "Test {} critical workflows in a staging environment",
            factors.critical_workflow_count
        ));
    }
    if !is_localized {
        recommendations.push("Consider a phased rollout across affected teams".to_string());
    }
    if factors.estimated_user_impact > 0 {
        recommendations.push(format!(
            "Prepare communication for approximately {} affected users",
            factors.estimated_user_impact
        ));
    }
    if requires_approval {
        recommendations.push("Obtain compliance approval before publishing".to_string());
    }
    if recommendations.is_empty() {
        recommendations
            .push("No specific mitigation required; follow the standard review process".to_string());
    }

    recommendations
}
