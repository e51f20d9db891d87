//! In-memory storage backend using HashMap.
//!
//! This module provides a fast, **ephemeral** store where all data is held in
//! RAM and **lost when the process exits** unless written out with
//! [`save_to_jsonl`]. It is suitable for:
//!
//! - Testing and development
//! - Short-lived CLI sessions backed by JSONL files
//! - Embedding the engine where another layer owns durable persistence
//!
//! # Architecture
//!
//! - `HashMap<PolicyId, Policy>` for policy lookups
//! - `HashMap<DependencyId, DependencyRecord>` for record lookups
//! - `HashMap<PolicyId, Vec<DependencyId>>` index preserving insertion order per policy
//!
//! # Thread Safety
//!
//! [`InMemoryStore`] is a cheap, cloneable handle over
//! `Arc<Mutex<InMemoryStoreInner>>`. Every operation takes the lock for its
//! own duration only, so concurrent analyses interleave at single-call
//! granularity and may observe each other's writes between calls.

mod inner;
mod jsonl;
mod trait_impl;

use crate::domain::{DependencyRecord, Policy};
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{LoadWarning, load_from_jsonl, save_to_jsonl};

/// Thread-safe in-memory store implementing both storage traits.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a policy so lookups can find it.
    pub async fn add_policy(&self, policy: Policy) -> Policy {
        let mut inner = self.inner.lock().await;
        inner.policies.insert(policy.id, policy.clone());
        policy
    }

    /// All registered policies, ordered by title.
    pub async fn policies(&self) -> Vec<Policy> {
        let inner = self.inner.lock().await;
        let mut policies: Vec<Policy> = inner.policies.values().cloned().collect();
        policies.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        policies
    }

    /// All records, active or not, in insertion order per policy.
    pub async fn records(&self) -> Vec<DependencyRecord> {
        let inner = self.inner.lock().await;
        inner.all_records()
    }

    /// Load records without checking that their policies exist.
    ///
    /// Used for bulk loading from files. Records with an ID already present
    /// replace the stored copy.
    pub async fn import_records(&self, records: Vec<DependencyRecord>) {
        let mut inner = self.inner.lock().await;
        for record in records {
            inner.upsert(record);
        }
    }
}
