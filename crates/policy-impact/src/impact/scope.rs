//! Change scope: how many and what kinds of entities a change reaches.

use crate::config::AnalysisConfig;
use crate::dependency::{DependencyGraph, TypeBreakdown};
use serde::{Deserialize, Serialize};

/// Upper bound of the impact radius.
pub const MAX_IMPACT_RADIUS: u32 = 10;

/// Radius below which (together with [`LOCALIZED_MAX_AFFECTED`]) a change is localized.
pub const LOCALIZED_MAX_RADIUS: u32 = 3;

/// Affected count below which (together with [`LOCALIZED_MAX_RADIUS`]) a change is localized.
pub const LOCALIZED_MAX_AFFECTED: usize = 5;

/// Quantified reach of a policy change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeScope {
    /// Number of graph edges
    pub total_affected: usize,

    /// Dependent node counts per type (root excluded)
    pub by_type: TypeBreakdown,

    /// Longest chain of records reached (the graph's `reach_depth`)
    pub max_depth: usize,

    /// `min(10, round(max_depth * 2 + total_affected / 5))`
    pub impact_radius: u32,

    /// `impact_radius < 3 && total_affected < 5`
    pub is_localized: bool,

    /// `workflows * users_per_workflow + modules * users_per_module`
    pub estimated_user_impact: u32,
}

impl ChangeScope {
    /// Derive the scope from a built graph.
    ///
    /// Depth comes from the graph's `reach_depth`, so declaring another
    /// record never shrinks the radius.
    #[must_use]
    pub fn from_graph(graph: &DependencyGraph, config: &AnalysisConfig) -> Self {
        let total_affected = graph.edges.len();
        let by_type = graph.node_type_counts();
        let impact_radius = impact_radius(graph.reach_depth, total_affected);

        Self {
            total_affected,
            by_type,
            max_depth: graph.reach_depth,
            impact_radius,
            is_localized: impact_radius < LOCALIZED_MAX_RADIUS
                && total_affected < LOCALIZED_MAX_AFFECTED,
            estimated_user_impact: by_type
                .workflow
                .saturating_mul(config.users_per_workflow)
                .saturating_add(by_type.module.saturating_mul(config.users_per_module)),
        }
    }
}

/// `min(10, round(max_depth * 2 + total_affected / 5))`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn impact_radius(max_depth: usize, total_affected: usize) -> u32 {
    let raw = (max_depth as f64 * 2.0 + total_affected as f64 / 5.0).round();
    (raw.min(f64::from(MAX_IMPACT_RADIUS))) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(0, 0, 0)]
    #[case::single_leaf(1, 1, 2)]
    #[case::rounds_down(1, 7, 3)]
    #[case::rounds_up(1, 8, 4)]
    #[case::exact(1, 10, 4)]
    #[case::two_levels(2, 19, 8)]
    #[case::capped(5, 40, 10)]
    fn test_impact_radius(#[case] depth: usize, #[case] affected: usize, #[case] expected: u32) {
        assert_eq!(impact_radius(depth, affected), expected);
    }
}
