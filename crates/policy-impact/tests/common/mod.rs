//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use policy_impact::dependency::DependencyService;
use policy_impact::domain::{
    DependencyRecord, DependencyStrength, DependentType, EntityId, NewDependency, Policy, PolicyId,
};
use policy_impact::impact::ImpactAnalysisService;
use policy_impact::storage::in_memory::InMemoryStore;
use std::sync::Arc;

/// A store with both services wired over it.
pub struct Engine {
    pub store: InMemoryStore,
    pub dependencies: DependencyService,
    pub impact: ImpactAnalysisService,
}

/// Fresh engine with default analysis settings.
pub fn engine() -> Engine {
    let store = InMemoryStore::new();
    let dependencies = DependencyService::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let impact = ImpactAnalysisService::new(dependencies.clone());
    Engine {
        store,
        dependencies,
        impact,
    }
}

/// Policy with a random ID.
pub fn policy(title: &str) -> Policy {
    policy_with_id(PolicyId::new(), title)
}

/// Policy with a fixed ID, e.g. one that doubles as a template entity.
pub fn policy_with_id(id: PolicyId, title: &str) -> Policy {
    Policy {
        id,
        title: title.to_string(),
        category: "clinical".to_string(),
        version: "1.0".to_string(),
        organization_id: uuid::Uuid::nil(),
    }
}

impl Engine {
    /// Register a new policy.
    pub async fn add_policy(&self, title: &str) -> Policy {
        self.store.add_policy(policy(title)).await
    }

    /// Register a template that can carry its own dependencies, returning
    /// its entity ID.
    pub async fn add_template(&self, title: &str) -> EntityId {
        let template = self.store.add_policy(policy(title)).await;
        EntityId::from(template.id)
    }

    /// Declare a dependency on a fresh entity.
    pub async fn depend(
        &self,
        policy_id: PolicyId,
        dependent_type: DependentType,
        strength: DependencyStrength,
    ) -> DependencyRecord {
        self.depend_on(policy_id, dependent_type, EntityId::new(), strength)
            .await
    }

    /// Declare a dependency on a given entity.
    pub async fn depend_on(
        &self,
        policy_id: PolicyId,
        dependent_type: DependentType,
        dependent_id: EntityId,
        strength: DependencyStrength,
    ) -> DependencyRecord {
        self.dependencies
            .create_dependency(
                NewDependency::new(policy_id, dependent_type, dependent_id).with_strength(strength),
            )
            .await
            .expect("create dependency")
    }

    /// Declare `count` dependencies of one type and strength.
    pub async fn depend_many(
        &self,
        policy_id: PolicyId,
        dependent_type: DependentType,
        strength: DependencyStrength,
        count: usize,
    ) {
        for _ in 0..count {
            self.depend(policy_id, dependent_type, strength).await;
        }
    }
}
