//! Change-impact analysis built on top of the dependency service.
//!
//! [`ImpactAnalysisService`] turns a policy's dependency data into a risk
//! assessment, affected-entity summaries, a change scope, a pre-publish
//! checklist and notification suggestions, and renders them as a report.
//!
//! Each public operation reads fresh data. [`ImpactAnalysisService::analyze_impact`]
//! takes one snapshot and derives every section from it instead of
//! re-reading per section. The reads behind a snapshot are not
//! transactional: a writer that lands between them is seen by the later
//! reads only (last read wins).

pub mod affected;
pub mod checklist;
pub mod report;
pub mod risk;
pub mod scope;

use crate::config::AnalysisConfig;
use crate::dependency::{DependencyGraph, DependencyService};
use crate::domain::{DependencyRecord, DependencyStrength, DependentType, Policy, PolicyId};
use crate::error::{Error, Result};
use chrono::Utc;
use tracing::{debug, info};

pub use affected::{AffectedEntity, AffectedModules, AffectedWorkflows};
pub use checklist::{
    ChecklistItem, NotificationAudience, NotificationPriority, NotificationSuggestion,
};
pub use report::{ImpactAnalysisReport, RenderedReport, ReportFormat};
pub use risk::{RiskAssessment, RiskFactors, risk_level_for_score};
pub use scope::ChangeScope;

/// Data one analysis is computed from.
///
/// Policy, graph and direct records are separate store reads.
struct Snapshot {
    policy: Policy,
    graph: DependencyGraph,
    records: Vec<DependencyRecord>,
}

impl Snapshot {
    fn scope(&self, config: &AnalysisConfig) -> ChangeScope {
        ChangeScope::from_graph(&self.graph, config)
    }

    fn risk(&self, scope: &ChangeScope, config: &AnalysisConfig) -> RiskAssessment {
        RiskAssessment::from_factors(
            risk_factors(&self.records, scope.impact_radius, config),
            scope.is_localized,
        )
    }
}

/// Risk formula inputs for a policy's direct active records.
fn risk_factors(
    records: &[DependencyRecord],
    impact_radius: u32,
    config: &AnalysisConfig,
) -> RiskFactors {
    let strong = records
        .iter()
        .filter(|r| r.strength == DependencyStrength::Strong);
    let strong_dependency_count = saturating_count(strong.clone());
    let critical_workflow_count =
        saturating_count(strong.filter(|r| r.dependent_type == DependentType::Workflow));

    RiskFactors {
        strong_dependency_count,
        total_dependencies: saturating_count(records.iter()),
        critical_workflow_count,
        impact_radius,
        estimated_user_impact: critical_workflow_count.saturating_mul(config.users_per_workflow),
    }
}

fn saturating_count<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}

/// Risk, scope and report generation for policy changes.
#[derive(Debug, Clone)]
pub struct ImpactAnalysisService {
    dependencies: DependencyService,
}

impl ImpactAnalysisService {
    /// Wrap a dependency service; its analysis settings are used throughout.
    #[must_use]
    pub fn new(dependencies: DependencyService) -> Self {
        Self { dependencies }
    }

    /// The underlying dependency service.
    #[must_use]
    pub fn dependencies(&self) -> &DependencyService {
        &self.dependencies
    }

    fn config(&self) -> &AnalysisConfig {
        self.dependencies.config()
    }

    async fn snapshot(&self, policy_id: &PolicyId) -> Result<Snapshot> {
        let policy = self.dependencies.get_policy(policy_id).await?;
        let graph = self
            .dependencies
            .build_dependency_graph(policy_id, None)
            .await?;
        let records = self.dependencies.get_dependencies(policy_id, false).await?;
        Ok(Snapshot {
            policy,
            graph,
            records,
        })
    }

    /// Score the risk of changing a policy.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn assess_risk(&self, policy_id: &PolicyId) -> Result<RiskAssessment> {
        let snapshot = self.snapshot(policy_id).await?;
        let scope = snapshot.scope(self.config());
        Ok(snapshot.risk(&scope, self.config()))
    }

    /// Workflows directly depending on a policy.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn get_affected_workflows(&self, policy_id: &PolicyId) -> Result<AffectedWorkflows> {
        let records = self.dependencies.get_dependencies(policy_id, false).await?;
        Ok(AffectedWorkflows::from_records(
            &records,
            self.config().users_per_workflow,
        ))
    }

    /// Modules directly depending on a policy.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn get_affected_modules(&self, policy_id: &PolicyId) -> Result<AffectedModules> {
        let records = self.dependencies.get_dependencies(policy_id, false).await?;
        Ok(AffectedModules::from_records(&records))
    }

    /// Measure how far a change to a policy reaches.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn calculate_change_scope(&self, policy_id: &PolicyId) -> Result<ChangeScope> {
        let graph = self
            .dependencies
            .build_dependency_graph(policy_id, None)
            .await?;
        Ok(ChangeScope::from_graph(&graph, self.config()))
    }

    /// Produce the full impact report for a policy.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn analyze_impact(
        &self,
        policy_id: &PolicyId,
        analyzed_by: Option<String>,
    ) -> Result<ImpactAnalysisReport> {
        let snapshot = self.snapshot(policy_id).await?;
        let config = self.config();

        let change_scope = snapshot.scope(config);
        let risk_assessment = snapshot.risk(&change_scope, config);
        let affected_workflows =
            AffectedWorkflows::from_records(&snapshot.records, config.users_per_workflow);
        let affected_modules = AffectedModules::from_records(&snapshot.records);
        let pre_publish_checklist = checklist::pre_publish_checklist(
            &risk_assessment,
            &affected_workflows,
            &affected_modules,
        );
        let suggested_notifications = checklist::suggested_notifications(
            &risk_assessment,
            &affected_workflows,
            &affected_modules,
        );

        info!(
            policy_id = %policy_id,
            risk_score = risk_assessment.overall_risk_score,
            risk_level = %risk_assessment.risk_level,
            affected = change_scope.total_affected,
            "Analyzed policy impact"
        );

        let Snapshot { policy, graph, .. } = snapshot;
        Ok(ImpactAnalysisReport {
            policy_id: policy.id,
            policy_title: policy.title,
            policy_version: policy.version,
            policy_category: policy.category,
            organization_id: policy.organization_id,
            analyzed_at: Utc::now(),
            analyzed_by,
            dependency_graph: graph,
            risk_assessment,
            affected_workflows,
            affected_modules,
            change_scope,
            pre_publish_checklist,
            suggested_notifications,
        })
    }

    /// Analyze a policy and render the report.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    /// - `Error::Unimplemented` for [`ReportFormat::Pdf`]; no analysis is run
    pub async fn generate_impact_report(
        &self,
        policy_id: &PolicyId,
        format: ReportFormat,
        analyzed_by: Option<String>,
    ) -> Result<RenderedReport> {
        if format == ReportFormat::Pdf {
            return Err(Error::Unimplemented("PDF report generation"));
        }
        let analysis = self.analyze_impact(policy_id, analyzed_by).await?;
        debug!(policy_id = %policy_id, format = %format, "Rendering impact report");
        report::render(analysis, format)
    }
}
