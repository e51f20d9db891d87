//! Dependency service: declared edges from policies to dependent entities.
//!
//! [`DependencyService`] owns the dependency lifecycle (create, update, soft
//! or hard delete, best-effort bulk create), per-policy aggregation, and
//! graph building. It reads policies through [`PolicyLookup`] and records
//! through [`DependencyStore`]; it never calls into the impact layer.
//!
//! # Example
//!
//! ```no_run
//! use policy_impact::dependency::DependencyService;
//! use policy_impact::domain::{DependentType, EntityId, NewDependency, Policy, PolicyId};
//! use policy_impact::storage::in_memory::InMemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InMemoryStore::new();
//!     let policy = store
//!         .add_policy(Policy {
//!             id: PolicyId::new(),
//!             title: "Falls prevention".to_string(),
//!             category: "clinical".to_string(),
//!             version: "2.0".to_string(),
//!             organization_id: uuid::Uuid::new_v4(),
//!         })
//!         .await;
//!
//!     let service = DependencyService::new(Arc::new(store.clone()), Arc::new(store));
//!     let record = service
//!         .create_dependency(NewDependency::new(
//!             policy.id,
//!             DependentType::Workflow,
//!             EntityId::new(),
//!         ))
//!         .await?;
//!     println!("{} -> {} ({})", record.policy_id, record.dependent_id, record.strength);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod graph;

use crate::config::AnalysisConfig;
use crate::domain::{
    DependencyFilter, DependencyId, DependencyRecord, DependencyStrength, DependencyUpdate,
    DependentType, EntityId, NewDependency, Policy, PolicyId,
};
use crate::error::{Error, Result};
use crate::storage::{DependencyStore, PolicyLookup};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use analysis::{DependencyAnalysis, StrengthBreakdown, TypeBreakdown};
pub use graph::{DependencyGraph, GraphEdge, GraphNode, NodeType};

/// Default strength suggested for a dependent type.
///
/// This is a static table: workflows break, modules, templates and
/// assessments need adjustment, training and documents are informational.
/// It is only consulted when no strength was chosen explicitly.
#[must_use]
pub fn calculate_dependency_strength(dependent_type: DependentType) -> DependencyStrength {
    match dependent_type {
        DependentType::Workflow => DependencyStrength::Strong,
        DependentType::Module | DependentType::Template | DependentType::Assessment => {
            DependencyStrength::Medium
        }
        DependentType::Training | DependentType::Document => DependencyStrength::Weak,
    }
}

/// Order records strongest first, then oldest first, then by ID.
pub(crate) fn sort_by_strength(records: &mut [DependencyRecord]) {
    records.sort_by(|a, b| {
        b.strength
            .rank()
            .cmp(&a.strength.rank())
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

/// Active records owned by `policy_id`, strongest first.
pub(crate) async fn active_dependencies(
    store: &dyn DependencyStore,
    policy_id: PolicyId,
) -> Result<Vec<DependencyRecord>> {
    let mut records = store
        .find(&DependencyFilter::for_policy(policy_id).active_only())
        .await?;
    sort_by_strength(&mut records);
    Ok(records)
}

/// One item that `bulk_create_dependencies` could not create.
#[derive(Debug)]
pub struct BulkCreateFailure {
    /// The rejected input
    pub input: NewDependency,
    /// Why it was rejected
    pub error: Error,
}

/// Result of a best-effort bulk create.
///
/// Partial success is normal; compare `created.len()` with `requested`.
#[derive(Debug, Default)]
pub struct BulkCreateOutcome {
    /// Number of items submitted
    pub requested: usize,
    /// Records that were created, in input order
    pub created: Vec<DependencyRecord>,
    /// Items that were skipped, in input order
    pub failures: Vec<BulkCreateFailure>,
}

impl BulkCreateOutcome {
    /// `true` when every submitted item was created.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.created.len() == self.requested
    }
}

/// CRUD, aggregation and graph building over dependency records.
#[derive(Clone)]
pub struct DependencyService {
    policies: Arc<dyn PolicyLookup>,
    store: Arc<dyn DependencyStore>,
    config: AnalysisConfig,
}

impl std::fmt::Debug for DependencyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyService")
            .field("config", &self.config)
            .field("policies", &"<dyn PolicyLookup>")
            .field("store", &"<dyn DependencyStore>")
            .finish()
    }
}

impl DependencyService {
    /// Create a service with default analysis settings.
    pub fn new(policies: Arc<dyn PolicyLookup>, store: Arc<dyn DependencyStore>) -> Self {
        Self {
            policies,
            store,
            config: AnalysisConfig::default(),
        }
    }

    /// Replace the analysis settings.
    #[must_use]
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Analysis settings in use.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Fetch a policy, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the lookup has no such policy
    pub async fn get_policy(&self, policy_id: &PolicyId) -> Result<Policy> {
        self.policies
            .find_policy_by_id(policy_id)
            .await?
            .ok_or(Error::PolicyNotFound(*policy_id))
    }

    /// Declare a new dependency.
    ///
    /// When `new.strength` is `None` the per-type default from
    /// [`calculate_dependency_strength`] is used.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the owning policy doesn't exist
    /// - `Error::DuplicateDependency` if the same edge is already active
    pub async fn create_dependency(&self, new: NewDependency) -> Result<DependencyRecord> {
        self.get_policy(&new.policy_id).await?;
        self.ensure_no_active_duplicate(new.policy_id, new.dependent_type, new.dependent_id, None)
            .await?;

        let now = Utc::now();
        let record = DependencyRecord {
            id: DependencyId::new(),
            policy_id: new.policy_id,
            dependent_type: new.dependent_type,
            dependent_id: new.dependent_id,
            strength: new
                .strength
                .unwrap_or_else(|| calculate_dependency_strength(new.dependent_type)),
            metadata: new.metadata,
            notes: new.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let record = self.store.save(record).await?;
        info!(
            dependency_id = %record.id,
            policy_id = %record.policy_id,
            dependent_type = %record.dependent_type,
            dependent_id = %record.dependent_id,
            strength = %record.strength,
            "Created dependency"
        );
        Ok(record)
    }

    /// Fetch a single record, active or not.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the record doesn't exist
    pub async fn get_dependency(&self, id: &DependencyId) -> Result<DependencyRecord> {
        self.store
            .get(id)
            .await?
            .ok_or(Error::DependencyNotFound(*id))
    }

    /// Records owned by a policy, strongest first then oldest first.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn get_dependencies(
        &self,
        policy_id: &PolicyId,
        include_inactive: bool,
    ) -> Result<Vec<DependencyRecord>> {
        self.get_policy(policy_id).await?;

        let mut filter = DependencyFilter::for_policy(*policy_id);
        if !include_inactive {
            filter = filter.active_only();
        }
        let mut records = self.store.find(&filter).await?;
        sort_by_strength(&mut records);

        debug!(policy_id = %policy_id, count = records.len(), include_inactive, "Fetched dependencies");
        Ok(records)
    }

    /// Records whose dependent is the given entity, across all policies.
    ///
    /// Answers "which policies govern this workflow?". Ordered like
    /// [`Self::get_dependencies`].
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn get_policies_for_entity(
        &self,
        dependent_type: DependentType,
        dependent_id: &EntityId,
        include_inactive: bool,
    ) -> Result<Vec<DependencyRecord>> {
        let mut filter = DependencyFilter::for_dependent(dependent_type, *dependent_id);
        if !include_inactive {
            filter = filter.active_only();
        }
        let mut records = self.store.find(&filter).await?;
        sort_by_strength(&mut records);
        Ok(records)
    }

    /// Aggregate a policy's active dependencies by type and strength.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the policy doesn't exist
    pub async fn analyze_dependencies(&self, policy_id: &PolicyId) -> Result<DependencyAnalysis> {
        let records = self.get_dependencies(policy_id, false).await?;
        let analysis = DependencyAnalysis::from_records(*policy_id, &records);
        debug!(
            policy_id = %policy_id,
            total = analysis.total_dependencies,
            risk_score = analysis.risk_score,
            "Analyzed dependencies"
        );
        Ok(analysis)
    }

    /// Build the dependency graph rooted at a policy.
    ///
    /// `max_depth` defaults to the configured `max-graph-depth`. See
    /// [`graph`] for traversal rules.
    ///
    /// # Errors
    ///
    /// - `Error::PolicyNotFound` if the root policy doesn't exist
    pub async fn build_dependency_graph(
        &self,
        policy_id: &PolicyId,
        max_depth: Option<usize>,
    ) -> Result<DependencyGraph> {
        let root = self.get_policy(policy_id).await?;
        let max_depth = max_depth.unwrap_or(self.config.max_graph_depth);
        graph::build_graph(self.store.as_ref(), &root, max_depth).await
    }

    /// Update strength, metadata, notes or activity of a record.
    ///
    /// Re-activating a record is subject to the same uniqueness check as
    /// creation.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the record doesn't exist
    /// - `Error::DuplicateDependency` if re-activation would duplicate an active edge
    pub async fn update_dependency(
        &self,
        id: &DependencyId,
        update: DependencyUpdate,
    ) -> Result<DependencyRecord> {
        let mut record = self.get_dependency(id).await?;

        if update.is_active == Some(true) && !record.is_active {
            self.ensure_no_active_duplicate(
                record.policy_id,
                record.dependent_type,
                record.dependent_id,
                Some(record.id),
            )
            .await?;
        }

        if let Some(strength) = update.strength {
            record.strength = strength;
        }
        if let Some(metadata) = update.metadata {
            record.metadata = metadata;
        }
        if let Some(notes) = update.notes {
            record.notes = notes;
        }
        if let Some(is_active) = update.is_active {
            record.is_active = is_active;
        }
        record.updated_at = Utc::now();

        let record = self.store.save(record).await?;
        info!(dependency_id = %record.id, strength = %record.strength, is_active = record.is_active, "Updated dependency");
        Ok(record)
    }

    /// Delete a record: soft (deactivate) by default, physical with `hard_delete`.
    ///
    /// Soft-deleting an already inactive record is a no-op.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the record doesn't exist
    pub async fn delete_dependency(&self, id: &DependencyId, hard_delete: bool) -> Result<()> {
        if hard_delete {
            self.store.remove(id).await?;
            info!(dependency_id = %id, "Hard-deleted dependency");
            return Ok(());
        }

        let mut record = self.get_dependency(id).await?;
        if record.is_active {
            record.is_active = false;
            record.updated_at = Utc::now();
            self.store.save(record).await?;
        }
        info!(dependency_id = %id, "Soft-deleted dependency");
        Ok(())
    }

    /// Create many dependencies, skipping the ones that fail.
    ///
    /// Items are attempted independently and in order, so a later item can
    /// collide with an earlier one from the same batch. Nothing is rolled back.
    pub async fn bulk_create_dependencies(&self, items: Vec<NewDependency>) -> BulkCreateOutcome {
        let mut outcome = BulkCreateOutcome {
            requested: items.len(),
            ..BulkCreateOutcome::default()
        };

        for item in items {
            match self.create_dependency(item.clone()).await {
                Ok(record) => outcome.created.push(record),
                Err(error) => {
                    warn!(
                        policy_id = %item.policy_id,
                        dependent_type = %item.dependent_type,
                        dependent_id = %item.dependent_id,
                        error = %error,
                        "Skipped dependency in bulk create"
                    );
                    outcome.failures.push(BulkCreateFailure { input: item, error });
                }
            }
        }

        info!(
            requested = outcome.requested,
            created = outcome.created.len(),
            failed = outcome.failures.len(),
            "Bulk dependency create finished"
        );
        outcome
    }

    async fn ensure_no_active_duplicate(
        &self,
        policy_id: PolicyId,
        dependent_type: DependentType,
        dependent_id: EntityId,
        except: Option<DependencyId>,
    ) -> Result<()> {
        let filter = DependencyFilter {
            policy_id: Some(policy_id),
            dependent_type: Some(dependent_type),
            dependent_id: Some(dependent_id),
            is_active: Some(true),
        };
        let existing = self.store.find(&filter).await?;
        if existing.iter().any(|r| Some(r.id) != except) {
            return Err(Error::DuplicateDependency {
                policy_id,
                dependent_type,
                dependent_id,
            });
        }
        Ok(())
    }
}
