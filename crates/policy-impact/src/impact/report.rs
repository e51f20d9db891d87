//! The impact analysis report and its renderings.

use super::affected::{AffectedModules, AffectedWorkflows};
use super::checklist::{ChecklistItem, NotificationSuggestion};
use super::risk::RiskAssessment;
use super::scope::ChangeScope;
use crate::dependency::DependencyGraph;
use crate::domain::PolicyId;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Everything known about the consequences of changing one policy.
///
/// Field names are part of the public contract; downstream consumers read
/// this structure directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysisReport {
    /// Analyzed policy
    pub policy_id: PolicyId,
    /// Policy title at analysis time
    pub policy_title: String,
    /// Policy version at analysis time
    pub policy_version: String,
    /// Policy category
    pub policy_category: String,
    /// Owning organization
    pub organization_id: uuid::Uuid,
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
    /// Who requested the analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_by: Option<String>,
    /// Graph reachable from the policy
    pub dependency_graph: DependencyGraph,
    /// Overall risk
    pub risk_assessment: RiskAssessment,
    /// Workflows touched
    pub affected_workflows: AffectedWorkflows,
    /// Modules touched
    pub affected_modules: AffectedModules,
    /// Reach of the change
    pub change_scope: ChangeScope,
    /// Steps before publishing
    pub pre_publish_checklist: Vec<ChecklistItem>,
    /// Who to tell
    pub suggested_notifications: Vec<NotificationSuggestion>,
}

/// Output format for [`super::ImpactAnalysisService::generate_impact_report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// The structured report
    #[default]
    Json,
    /// A self-contained HTML page
    Html,
    /// Not supported; always fails
    Pdf,
}

impl ReportFormat {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            _ => Err(Error::InvalidArgument {
                field: "format",
                value: s.to_string(),
                valid_values: "json, html, pdf",
            }),
        }
    }
}

/// A report in its requested format.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedReport {
    /// The structured report, unchanged
    Json(Box<ImpactAnalysisReport>),
    /// Rendered HTML page
    Html(String),
}

impl RenderedReport {
    /// MIME type of the rendering.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::Html(_) => "text/html; charset=utf-8",
        }
    }

    /// Serialize into a response body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the report cannot be serialized.
    pub fn to_body(&self) -> Result<String> {
        match self {
            Self::Json(report) => Ok(serde_json::to_string_pretty(report)?),
            Self::Html(html) => Ok(html.clone()),
        }
    }
}

/// Render `report` in `format`.
///
/// # Errors
///
/// - `Error::Unimplemented` for [`ReportFormat::Pdf`]
pub fn render(report: ImpactAnalysisReport, format: ReportFormat) -> Result<RenderedReport> {
    match format {
        ReportFormat::Json => Ok(RenderedReport::Json(Box::new(report))),
        ReportFormat::Html => Ok(RenderedReport::Html(render_html(&report)?)),
        ReportFormat::Pdf => Err(Error::Unimplemented("PDF report generation")),
    }
}

fn render_html(report: &ImpactAnalysisReport) -> std::result::Result<String, fmt::Error> {
    let mut html = String::new();
    let title = escape_html(&report.policy_title);
    let risk = &report.risk_assessment;

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\">")?;
    writeln!(html, "<title>Impact Analysis: {title}</title>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>Impact Analysis: {title}</h1>")?;
    writeln!(
        html,
        "<p>Version {} &middot; analyzed {}</p>",
        escape_html(&report.policy_version),
        report.analyzed_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(
        html,
        "<h2>Risk Level: <span class=\"risk-{level}\">{level}</span> (score {score})</h2>",
        level = risk.risk_level.as_str(),
        score = risk.overall_risk_score
    )?;

    writeln!(
        html,
        "<h2>Affected Workflows ({})</h2>",
        report.affected_workflows.total_workflows
    )?;
    writeln!(html, "<ul>")?;
    for workflow in &report.affected_workflows.workflows {
        writeln!(
            html,
            "<li>{} &mdash; {} risk</li>",
            workflow.entity_id,
            workflow.risk_level.as_str()
        )?;
    }
    writeln!(html, "</ul>")?;

    writeln!(html, "<h2>Mitigation Recommendations</h2>")?;
    writeln!(html, "<ul>")?;
    for recommendation in &risk.mitigation_recommendations {
        writeln!(html, "<li>{}</li>", escape_html(recommendation))?;
    }
    writeln!(html, "</ul>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
