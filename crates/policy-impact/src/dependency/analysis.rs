//! Per-policy dependency aggregation.
//!
//! Breakdowns are fixed structs with one field per enumeration value, so
//! every key is present in the output even when the count is zero.

use crate::domain::{DependencyRecord, DependencyStrength, DependentType, PolicyId};
use serde::{Deserialize, Serialize};

/// Upper bound of the local dependency risk score.
pub const MAX_LOCAL_RISK_SCORE: u32 = 100;

/// Record counts per dependency strength.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthBreakdown {
    /// Strong edges
    pub strong: u32,
    /// Medium edges
    pub medium: u32,
    /// Weak edges
    pub weak: u32,
}

impl StrengthBreakdown {
    /// Count one more edge of `strength`.
    pub fn record(&mut self, strength: DependencyStrength) {
        match strength {
            DependencyStrength::Strong => self.strong += 1,
            DependencyStrength::Medium => self.medium += 1,
            DependencyStrength::Weak => self.weak += 1,
        }
    }

    /// Count for `strength`.
    #[must_use]
    pub fn get(&self, strength: DependencyStrength) -> u32 {
        match strength {
            DependencyStrength::Strong => self.strong,
            DependencyStrength::Medium => self.medium,
            DependencyStrength::Weak => self.weak,
        }
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.strong + self.medium + self.weak
    }

    /// Local risk signal: `min(100, strong*10 + medium*5 + weak*2)`.
    #[must_use]
    pub fn local_risk_score(&self) -> u32 {
        let raw = self
            .strong
            .saturating_mul(10)
            .saturating_add(self.medium.saturating_mul(5))
            .saturating_add(self.weak.saturating_mul(2));
        raw.min(MAX_LOCAL_RISK_SCORE)
    }
}

/// Record (or node) counts per dependent type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    /// Workflows
    pub workflow: u32,
    /// Modules
    pub module: u32,
    /// Templates
    pub template: u32,
    /// Assessments
    pub assessment: u32,
    /// Training units
    pub training: u32,
    /// Documents
    pub document: u32,
}

impl TypeBreakdown {
    /// Count one more entity of `dependent_type`.
    pub fn record(&mut self, dependent_type: DependentType) {
        *self.slot(dependent_type) += 1;
    }

    /// Count for `dependent_type`.
    #[must_use]
    pub fn get(&self, dependent_type: DependentType) -> u32 {
        match dependent_type {
            DependentType::Workflow => self.workflow,
            DependentType::Module => self.module,
            DependentType::Template => self.template,
            DependentType::Assessment => self.assessment,
            DependentType::Training => self.training,
            DependentType::Document => self.document,
        }
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        DependentType::ALL.into_iter().map(|t| self.get(t)).sum()
    }

    fn slot(&mut self, dependent_type: DependentType) -> &mut u32 {
        match dependent_type {
            DependentType::Workflow => &mut self.workflow,
            DependentType::Module => &mut self.module,
            DependentType::Template => &mut self.template,
            DependentType::Assessment => &mut self.assessment,
            DependentType::Training => &mut self.training,
            DependentType::Document => &mut self.document,
        }
    }
}

/// Aggregate view of one policy's active dependencies.
///
/// `risk_score` is a local signal computed from direct edges only; the
/// graph-wide score lives in [`crate::impact::RiskAssessment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAnalysis {
    /// Analyzed policy
    pub policy_id: PolicyId,

    /// Number of active dependencies
    pub total_dependencies: u32,

    /// Counts per dependent type
    pub by_type: TypeBreakdown,

    /// Counts per strength
    pub by_strength: StrengthBreakdown,

    /// Records with strong coupling
    pub critical_dependencies: Vec<DependencyRecord>,

    /// `min(100, strong*10 + medium*5 + weak*2)`
    pub risk_score: u32,
}

impl DependencyAnalysis {
    /// Aggregate `records`, which must be the policy's active dependencies.
    #[must_use]
    pub fn from_records(policy_id: PolicyId, records: &[DependencyRecord]) -> Self {
        let mut by_type = TypeBreakdown::default();
        let mut by_strength = StrengthBreakdown::default();

        for record in records {
            by_type.record(record.dependent_type);
            by_strength.record(record.strength);
        }

        let critical_dependencies = records
            .iter()
            .filter(|r| r.strength == DependencyStrength::Strong)
            .cloned()
            .collect();

        Self {
            policy_id,
            total_dependencies: by_strength.total(),
            by_type,
            by_strength,
            critical_dependencies,
            risk_score: by_strength.local_risk_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(0, 0, 0, 0)]
    #[case::one_each(1, 1, 1, 17)]
    #[case::strong_only(4, 0, 0, 40)]
    #[case::clamped(9, 3, 1, 100)]
    #[case::weak_heavy(0, 0, 50, 100)]
    fn test_local_risk_score(
        #[case] strong: u32,
        #[case] medium: u32,
        #[case] weak: u32,
        #[case] expected: u32,
    ) {
        let breakdown = StrengthBreakdown {
            strong,
            medium,
            weak,
        };
        assert_eq!(breakdown.local_risk_score(), expected);
    }

    #[test]
    fn test_type_breakdown_serializes_every_key() {
        let mut breakdown = TypeBreakdown::default();
        breakdown.record(DependentType::Workflow);
        breakdown.record(DependentType::Workflow);

        let json = serde_json::to_value(breakdown).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert_eq!(json["workflow"], 2);
        assert_eq!(json["document"], 0);
        assert_eq!(breakdown.total(), 2);
    }
}
