//! Integration tests for risk scoring, change scope and report generation.

mod common;

use common::{Engine, engine};
use policy_impact::config::AnalysisConfig;
use policy_impact::dependency::DependencyService;
use policy_impact::domain::{
    DependencyMetadata, DependencyStrength, DependentType, EntityId, NewDependency, Policy,
    PolicyId, RiskLevel,
};
use policy_impact::error::{Error, ErrorKind};
use policy_impact::impact::{
    ImpactAnalysisService, NotificationAudience, RenderedReport, ReportFormat,
};
use std::sync::Arc;

/// W1 strong workflow, M1 medium module, T1 weak training.
async fn concrete_scenario(engine: &Engine) -> Policy {
    let policy = engine.add_policy("Moving and handling").await;
    engine
        .depend(policy.id, DependentType::Workflow, DependencyStrength::Strong)
        .await;
    engine
        .depend(policy.id, DependentType::Module, DependencyStrength::Medium)
        .await;
    engine
        .depend(policy.id, DependentType::Training, DependencyStrength::Weak)
        .await;
    policy
}

/// 18 (total) + 12 (radius 8) = 30.
///
/// Seven weak documents plus two medium templates with five weak documents
/// each: nine direct records, nineteen edges, depth two.
async fn score_30(engine: &Engine) -> PolicyId {
    let policy = engine.add_policy("Score 30").await;
    engine
        .depend_many(policy.id, DependentType::Document, DependencyStrength::Weak, 7)
        .await;
    for i in 0..2 {
        let template = engine.add_template(&format!("Template {i}")).await;
        engine
            .depend_on(policy.id, DependentType::Template, template, DependencyStrength::Medium)
            .await;
        engine
            .depend_many(
                PolicyId::from(template),
                DependentType::Document,
                DependencyStrength::Weak,
                5,
            )
            .await;
    }
    policy.id
}

/// 20 (strong) + 20 (total) + 10 (workflows) + 6 (radius 4) + 4 (users) = 60.
async fn score_60(engine: &Engine) -> PolicyId {
    let policy = engine.add_policy("Score 60").await;
    engine
        .depend_many(policy.id, DependentType::Workflow, DependencyStrength::Strong, 2)
        .await;
    engine
        .depend_many(policy.id, DependentType::Document, DependencyStrength::Weak, 8)
        .await;
    policy.id
}

/// 30 (strong) + 16 (total) + 20 (workflows) + 6 (radius 4) + 8 (users) = 80.
async fn score_80(engine: &Engine) -> PolicyId {
    let policy = engine.add_policy("Score 80").await;
    engine
        .depend_many(policy.id, DependentType::Workflow, DependencyStrength::Strong, 4)
        .await;
    engine
        .depend_many(policy.id, DependentType::Document, DependencyStrength::Weak, 4)
        .await;
    policy.id
}

#[tokio::test]
async fn test_concrete_scenario_affected_workflows() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;

    let workflows = engine
        .impact
        .get_affected_workflows(&policy.id)
        .await
        .unwrap();
    assert_eq!(workflows.total_workflows, 1);
    assert_eq!(workflows.workflows[0].risk_level, RiskLevel::Critical);
    assert_eq!(workflows.workflows[0].affected_user_count, Some(20));
    assert_eq!(workflows.critical_workflows.len(), 1);

    let modules = engine.impact.get_affected_modules(&policy.id).await.unwrap();
    assert_eq!(modules.total_modules, 1);
    assert_eq!(modules.modules[0].risk_level, RiskLevel::High);
    assert_eq!(modules.critical_modules.len(), 1);
}

#[tokio::test]
async fn test_concrete_scenario_risk() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;

    // 10 + 6 + 5 + 4.5 (radius 3) + 2 = 27.5
    let risk = engine.impact.assess_risk(&policy.id).await.unwrap();
    assert_eq!(risk.risk_factors.strong_dependency_count, 1);
    assert_eq!(risk.risk_factors.total_dependencies, 3);
    assert_eq!(risk.risk_factors.critical_workflow_count, 1);
    assert_eq!(risk.risk_factors.impact_radius, 3);
    assert_eq!(risk.risk_factors.estimated_user_impact, 20);
    assert_eq!(risk.overall_risk_score, 28);
    assert_eq!(risk.risk_level, RiskLevel::Low);
    assert!(!risk.requires_approval);
    assert!(
        risk.mitigation_recommendations
            .iter()
            .any(|r| r.contains("phased rollout"))
    );
}

#[tokio::test]
async fn test_threshold_boundaries() {
    let engine = engine();
    let cases = [
        (score_30(&engine).await, 30, RiskLevel::Medium, false),
        (score_60(&engine).await, 60, RiskLevel::High, true),
        (score_80(&engine).await, 80, RiskLevel::Critical, true),
    ];

    for (policy_id, score, level, approval) in cases {
        let risk = engine.impact.assess_risk(&policy_id).await.unwrap();
        assert_eq!(risk.overall_risk_score, score, "{risk:?}");
        assert_eq!(risk.risk_level, level);
        assert_eq!(risk.requires_approval, approval);
    }
}

#[tokio::test]
async fn test_adding_a_strong_dependency_never_lowers_the_score() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;
    let mut previous = engine.impact.assess_risk(&policy.id).await.unwrap();

    for dependent_type in [
        DependentType::Workflow,
        DependentType::Module,
        DependentType::Document,
        DependentType::Workflow,
        DependentType::Assessment,
        DependentType::Workflow,
        DependentType::Workflow,
        DependentType::Workflow,
    ] {
        engine
            .depend(policy.id, dependent_type, DependencyStrength::Strong)
            .await;
        let next = engine.impact.assess_risk(&policy.id).await.unwrap();
        assert!(next.overall_risk_score >= previous.overall_risk_score);
        assert!(next.overall_risk_score <= 100);
        previous = next;
    }
}

#[tokio::test]
async fn test_strong_shortcut_into_template_chain_never_lowers_the_score() {
    let engine = engine();
    let policy = engine.add_policy("Shortcut").await;
    engine
        .depend_many(policy.id, DependentType::Workflow, DependencyStrength::Strong, 3)
        .await;
    engine
        .depend_many(policy.id, DependentType::Document, DependencyStrength::Weak, 6)
        .await;
    let mut chain = Vec::new();
    let mut owner = policy.id;
    for i in 0..5 {
        let template = engine.add_template(&format!("T{i}")).await;
        engine
            .depend_on(owner, DependentType::Template, template, DependencyStrength::Weak)
            .await;
        chain.push(template);
        owner = PolicyId::from(template);
    }

    // 30 + 20 + 15 + 15 (radius 10) + 6 = 86
    let before = engine.impact.assess_risk(&policy.id).await.unwrap();
    assert_eq!(before.risk_factors.impact_radius, 10);
    assert_eq!(before.overall_risk_score, 86);

    engine
        .depend_on(policy.id, DependentType::Template, chain[2], DependencyStrength::Strong)
        .await;

    let after = engine.impact.assess_risk(&policy.id).await.unwrap();
    assert_eq!(after.risk_factors.strong_dependency_count, 4);
    assert_eq!(after.risk_factors.impact_radius, 10);
    assert!(after.overall_risk_score >= before.overall_risk_score);

    let scope = engine
        .impact
        .calculate_change_scope(&policy.id)
        .await
        .unwrap();
    assert_eq!(scope.max_depth, 5);
}

#[tokio::test]
async fn test_zero_dependencies_scope_is_localized() {
    let engine = engine();
    let policy = engine.add_policy("Quiet").await;

    let scope = engine
        .impact
        .calculate_change_scope(&policy.id)
        .await
        .unwrap();
    assert_eq!(scope.total_affected, 0);
    assert_eq!(scope.impact_radius, 0);
    assert_eq!(scope.max_depth, 0);
    assert!(scope.is_localized);
    assert_eq!(scope.estimated_user_impact, 0);

    let risk = engine.impact.assess_risk(&policy.id).await.unwrap();
    assert_eq!(risk.overall_risk_score, 0);
    assert_eq!(risk.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_scope_counts_graph_nodes_and_users() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;

    let scope = engine
        .impact
        .calculate_change_scope(&policy.id)
        .await
        .unwrap();
    assert_eq!(scope.total_affected, 3);
    assert_eq!(scope.by_type.workflow, 1);
    assert_eq!(scope.by_type.module, 1);
    assert_eq!(scope.by_type.training, 1);
    assert_eq!(scope.impact_radius, 3);
    assert!(!scope.is_localized);
    assert_eq!(scope.estimated_user_impact, 30);
}

#[tokio::test]
async fn test_user_multipliers_are_configurable() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;
    let config = AnalysisConfig {
        users_per_workflow: 100,
        users_per_module: 0,
        ..AnalysisConfig::default()
    };
    let dependencies =
        DependencyService::new(Arc::new(engine.store.clone()), Arc::new(engine.store.clone()))
            .with_config(config);
    let impact = ImpactAnalysisService::new(dependencies);

    let scope = impact.calculate_change_scope(&policy.id).await.unwrap();
    assert_eq!(scope.estimated_user_impact, 100);

    let workflows = impact.get_affected_workflows(&policy.id).await.unwrap();
    assert_eq!(workflows.workflows[0].affected_user_count, Some(100));
    assert_eq!(workflows.estimated_affected_users, 100);
}

#[tokio::test]
async fn test_affected_entities_carry_metadata_and_actions() {
    let engine = engine();
    let policy = engine.add_policy("Medication").await;
    engine
        .dependencies
        .create_dependency(
            NewDependency::new(policy.id, DependentType::Workflow, EntityId::new()).with_metadata(
                DependencyMetadata {
                    impact_description: Some("Dose checks change".to_string()),
                    affected_sections: vec!["3.1".to_string()],
                    automatic_update: Some(true),
                    ..DependencyMetadata::default()
                },
            ),
        )
        .await
        .unwrap();

    let workflows = engine
        .impact
        .get_affected_workflows(&policy.id)
        .await
        .unwrap();
    let workflow = &workflows.workflows[0];
    assert_eq!(workflow.impact_description.as_deref(), Some("Dose checks change"));
    assert_eq!(workflow.affected_sections, vec!["3.1"]);
    assert!(workflow.automatic_update);
    assert_eq!(
        workflow.recommended_actions,
        vec![
            "Test thoroughly before publishing",
            "Notify all users of the change",
            "Create a rollback plan",
            "Will auto-update",
        ]
    );
}

#[tokio::test]
async fn test_analyze_impact_assembles_consistent_report() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;

    let report = engine
        .impact
        .analyze_impact(&policy.id, Some("quality lead".to_string()))
        .await
        .unwrap();

    assert_eq!(report.policy_id, policy.id);
    assert_eq!(report.policy_title, policy.title);
    assert_eq!(report.policy_version, policy.version);
    assert_eq!(report.policy_category, policy.category);
    assert_eq!(report.organization_id, policy.organization_id);
    assert_eq!(report.analyzed_by.as_deref(), Some("quality lead"));
    assert_eq!(report.dependency_graph.edges.len(), report.change_scope.total_affected);
    assert_eq!(
        report.risk_assessment.risk_factors.impact_radius,
        report.change_scope.impact_radius
    );
    assert_eq!(report.affected_workflows.total_workflows, 1);
    assert_eq!(report.affected_modules.total_modules, 1);

    let ids: Vec<&str> = report
        .pre_publish_checklist
        .iter()
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "review-changes",
            "regulatory-compliance",
            "test-critical-workflows",
            "verify-critical-modules",
            "update-training",
            "schedule-review",
        ]
    );

    let audiences: Vec<NotificationAudience> = report
        .suggested_notifications
        .iter()
        .map(|n| n.audience)
        .collect();
    assert_eq!(
        audiences,
        vec![
            NotificationAudience::WorkflowOwners,
            NotificationAudience::ModuleAdministrators
        ]
    );
}

#[tokio::test]
async fn test_critical_report_requires_approval_and_rollback() {
    let engine = engine();
    let policy_id = score_80(&engine).await;

    let report = engine.impact.analyze_impact(&policy_id, None).await.unwrap();
    let required: Vec<&str> = report
        .pre_publish_checklist
        .iter()
        .filter(|item| item.required)
        .map(|item| item.id.as_str())
        .collect();

    assert!(required.contains(&"obtain-approval"));
    assert!(required.contains(&"rollback-plan"));
    assert!(required.contains(&"schedule-notifications"));
    assert_eq!(
        report.suggested_notifications[0].audience,
        NotificationAudience::AllStaff
    );
    assert!(
        report
            .suggested_notifications
            .iter()
            .any(|n| n.audience == NotificationAudience::ComplianceTeam)
    );
}

#[tokio::test]
async fn test_report_json_uses_contract_field_names() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;

    let rendered = engine
        .impact
        .generate_impact_report(&policy.id, ReportFormat::Json, None)
        .await
        .unwrap();
    assert_eq!(rendered.content_type(), "application/json");

    let json: serde_json::Value = serde_json::from_str(&rendered.to_body().unwrap()).unwrap();
    for field in [
        "policyId",
        "policyTitle",
        "policyVersion",
        "analyzedAt",
        "dependencyGraph",
        "riskAssessment",
        "affectedWorkflows",
        "affectedModules",
        "changeScope",
        "prePublishChecklist",
        "suggestedNotifications",
    ] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
    assert_eq!(json["riskAssessment"]["overallRiskScore"], 28);
    assert_eq!(json["riskAssessment"]["riskLevel"], "low");
    assert_eq!(json["changeScope"]["isLocalized"], false);
}

#[tokio::test]
async fn test_report_html_embeds_summary() {
    let engine = engine();
    let policy = engine.add_policy("Bathing & <hygiene>").await;
    let workflow = engine
        .depend(policy.id, DependentType::Workflow, DependencyStrength::Strong)
        .await;

    let rendered = engine
        .impact
        .generate_impact_report(&policy.id, ReportFormat::Html, None)
        .await
        .unwrap();
    let RenderedReport::Html(html) = &rendered else {
        panic!("expected HTML, got {rendered:?}");
    };

    assert!(html.starts_with("<!DOCTYPE html>\n"));
    assert!(html.ends_with("</body>\n</html>\n"));
    assert!(html.contains("Bathing &amp; &lt;hygiene&gt;"));
    assert!(html.contains("Risk Level"));
    assert!(html.contains(&workflow.dependent_id.to_string()));
    assert!(html.contains("Review 1 critical dependencies before publishing"));
    assert_eq!(rendered.content_type(), "text/html; charset=utf-8");
}

#[tokio::test]
async fn test_pdf_is_unimplemented() {
    let engine = engine();
    let policy = concrete_scenario(&engine).await;

    let err = engine
        .impact
        .generate_impact_report(&policy.id, ReportFormat::Pdf, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unimplemented(_)));
    assert_eq!(err.kind(), ErrorKind::Unimplemented);
    assert_eq!(err.kind().status_code(), 501);
    assert!(err.to_string().contains("not implemented"));
}

#[tokio::test]
async fn test_impact_operations_on_missing_policy_are_not_found() {
    let engine = engine();
    let missing = PolicyId::new();

    assert!(matches!(
        engine.impact.assess_risk(&missing).await,
        Err(Error::PolicyNotFound(_))
    ));
    assert!(matches!(
        engine.impact.get_affected_workflows(&missing).await,
        Err(Error::PolicyNotFound(_))
    ));
    assert!(matches!(
        engine.impact.calculate_change_scope(&missing).await,
        Err(Error::PolicyNotFound(_))
    ));
    assert!(matches!(
        engine.impact.analyze_impact(&missing, None).await,
        Err(Error::PolicyNotFound(_))
    ));
}
