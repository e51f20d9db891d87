//! Command execution logic.

use super::args::{
    AnalyzeArgs, DepAction, DepArgs, GraphArgs, InitArgs, PolicyAction, PolicyArgs, ReportArgs,
};
use crate::app::App;
use crate::dependency::calculate_dependency_strength;
use crate::domain::{
    DependencyMetadata, DependencyUpdate, DependentType, NewDependency, Policy, PolicyId,
};
use crate::impact::{RenderedReport, ReportFormat};
use crate::output::{self, OutputMode};
use anyhow::Result;
use std::path::Path;

/// Execute the init command
pub async fn execute_init(dir: &Path, args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let result = init::init(dir).await?;

    if !args.quiet {
        println!("Initialized policy-impact in {}", result.project_dir.display());
        println!("  Config:       {}", result.config_file.display());
        println!("  Policies:     {}", result.policies_file.display());
        println!("  Dependencies: {}", result.dependencies_file.display());
    }
    Ok(())
}

/// Execute the policy command
pub async fn execute_policy(app: &App, args: &PolicyArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        PolicyAction::Add {
            title,
            category,
            policy_version,
            organization,
        } => {
            let policy = app
                .store()
                .add_policy(Policy {
                    id: PolicyId::new(),
                    title: title.clone(),
                    category: category.clone(),
                    version: policy_version.clone(),
                    organization_id: organization.unwrap_or_else(uuid::Uuid::new_v4),
                })
                .await;
            app.save().await?;
            output::print_policy(&policy, output_mode)?;
        }
        PolicyAction::List => {
            let policies = app.store().policies().await;
            match output_mode {
                OutputMode::Json => output::print_json(&policies)?,
                OutputMode::Text if policies.is_empty() => {
                    output::print_message("No policies registered.")?;
                }
                OutputMode::Text => {
                    for policy in &policies {
                        output::print_policy(policy, output_mode)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    let service = app.dependencies();

    match &args.action {
        DepAction::Add {
            policy,
            dependent_type,
            entity,
            strength,
            notes,
            impact_description,
            automatic_update,
        } => {
            let metadata = DependencyMetadata {
                impact_description: impact_description.clone(),
                automatic_update: automatic_update.then_some(true),
                ..DependencyMetadata::default()
            };
            let mut new = NewDependency::new(*policy, (*dependent_type).into(), *entity)
                .with_metadata(metadata);
            if let Some(strength) = strength {
                new = new.with_strength((*strength).into());
            }
            if let Some(notes) = notes {
                new = new.with_notes(notes.clone());
            }

            let record = service.create_dependency(new).await?;
            app.save().await?;
            output::print_record(&record, output_mode)?;
        }
        DepAction::List {
            policy,
            include_inactive,
        } => {
            let records = service.get_dependencies(policy, *include_inactive).await?;
            output::print_records(&records, output_mode)?;
        }
        DepAction::Dependents {
            dependent_type,
            entity,
            include_inactive,
        } => {
            let records = service
                .get_policies_for_entity((*dependent_type).into(), entity, *include_inactive)
                .await?;
            output::print_records(&records, output_mode)?;
        }
        DepAction::Remove { id, hard } => {
            service.delete_dependency(id, *hard).await?;
            app.save().await?;
            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "id": id,
                    "hardDeleted": hard,
                }))?,
                OutputMode::Text => {
                    let verb = if *hard { "Deleted" } else { "Deactivated" };
                    output::print_message(&format!("{verb} dependency {id}"))?;
                }
            }
        }
        DepAction::Restore { id } => {
            let record = service
                .update_dependency(
                    id,
                    DependencyUpdate {
                        is_active: Some(true),
                        ..DependencyUpdate::default()
                    },
                )
                .await?;
            app.save().await?;
            output::print_record(&record, output_mode)?;
        }
        DepAction::Suggest { dependent_type } => {
            let dependent_type = DependentType::from(*dependent_type);
            output::print_suggestion(
                dependent_type,
                calculate_dependency_strength(dependent_type),
                output_mode,
            )?;
        }
    }
    Ok(())
}

/// Execute the analyze command
pub async fn execute_analyze(app: &App, args: &AnalyzeArgs, output_mode: OutputMode) -> Result<()> {
    let analysis = app.dependencies().analyze_dependencies(&args.policy).await?;
    output::print_analysis(&analysis, output_mode)?;
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let graph = app
        .dependencies()
        .build_dependency_graph(&args.policy, args.max_depth)
        .await?;
    output::print_graph(&graph, output_mode)?;
    Ok(())
}

/// Execute the report command.
///
/// The report body is printed as-is; `--json` has no effect here.
pub async fn execute_report(app: &App, args: &ReportArgs) -> Result<()> {
    let format = ReportFormat::from(args.format);
    let rendered = app
        .impact()
        .generate_impact_report(&args.policy, format, args.analyzed_by.clone())
        .await?;

    if let RenderedReport::Json(report) = &rendered {
        tracing::debug!(
            risk_level = %report.risk_assessment.risk_level,
            checklist_items = report.pre_publish_checklist.len(),
            "Generated report"
        );
    }
    output::print_message(&rendered.to_body()?)?;
    Ok(())
}
