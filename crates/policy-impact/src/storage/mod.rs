//! Storage abstraction layer for the policy impact engine.
//!
//! The engine treats persistence as an external collaborator reached through
//! two narrow traits:
//!
//! - [`PolicyLookup`]: read-only access to policy metadata
//! - [`DependencyStore`]: find/save/remove over dependency records
//!
//! Both traits are async and object-safe so services can hold
//! `Arc<dyn PolicyLookup>` / `Arc<dyn DependencyStore>` regardless of backend.
//! Methods take `&self`; implementations handle their own synchronization,
//! which lets concurrent analyses share one store.
//!
//! The bundled [`in_memory`] backend implements both traits and can be loaded
//! from and saved to JSONL files.
//!
//! # Example
//!
//! ```no_run
//! use policy_impact::domain::{DependencyFilter, Policy, PolicyId};
//! use policy_impact::storage::in_memory::InMemoryStore;
//! use policy_impact::storage::{DependencyStore, PolicyLookup};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InMemoryStore::new();
//!     let policy = store
//!         .add_policy(Policy {
//!             id: PolicyId::new(),
//!             title: "Medication administration".to_string(),
//!             category: "clinical".to_string(),
//!             version: "3.1".to_string(),
//!             organization_id: uuid::Uuid::new_v4(),
//!         })
//!         .await;
//!
//!     assert!(store.find_policy_by_id(&policy.id).await?.is_some());
//!     let records = store.find(&DependencyFilter::for_policy(policy.id)).await?;
//!     assert!(records.is_empty());
//!     Ok(())
//! }
//! ```

use crate::domain::{DependencyFilter, DependencyId, DependencyRecord, Policy, PolicyId};
use crate::error::Result;
use async_trait::async_trait;

pub mod in_memory;

/// Read-only access to policy metadata.
#[async_trait]
pub trait PolicyLookup: Send + Sync {
    /// Look up a policy by ID.
    ///
    /// Returns `None` if the policy doesn't exist.
    async fn find_policy_by_id(&self, id: &PolicyId) -> Result<Option<Policy>>;
}

/// Persistence for dependency records.
///
/// # Error Handling
///
/// - `remove` returns `Error::DependencyNotFound` for unknown IDs
/// - Backend failures surface as `Error::Io` or `Error::Json`
///
/// Implementations do not enforce the active-uniqueness invariant; the
/// dependency service checks it before writing.
#[async_trait]
pub trait DependencyStore: Send + Sync {
    /// Find all records matching `filter`, in insertion order.
    async fn find(&self, filter: &DependencyFilter) -> Result<Vec<DependencyRecord>>;

    /// Get a record by ID.
    ///
    /// Returns `None` if the record doesn't exist.
    async fn get(&self, id: &DependencyId) -> Result<Option<DependencyRecord>>;

    /// Insert or replace a record, keyed by its ID.
    async fn save(&self, record: DependencyRecord) -> Result<DependencyRecord>;

    /// Physically remove a record.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the record doesn't exist
    async fn remove(&self, id: &DependencyId) -> Result<()>;
}
