//! Storage trait implementations for the in-memory store.

use super::InMemoryStore;
use crate::domain::{DependencyFilter, DependencyId, DependencyRecord, Policy, PolicyId};
use crate::error::{Error, Result};
use crate::storage::{DependencyStore, PolicyLookup};
use async_trait::async_trait;

#[async_trait]
impl PolicyLookup for InMemoryStore {
    async fn find_policy_by_id(&self, id: &PolicyId) -> Result<Option<Policy>> {
        let inner = self.inner.lock().await;
        Ok(inner.policies.get(id).cloned())
    }
}

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn find(&self, filter: &DependencyFilter) -> Result<Vec<DependencyRecord>> {
        let inner = self.inner.lock().await;

        // Use the per-policy index when possible; otherwise scan everything.
        let records = match filter.policy_id {
            Some(policy_id) => inner
                .records_for_policy(policy_id)
                .filter(|record| filter.matches(record))
                .cloned()
                .collect(),
            None => inner
                .all_records()
                .into_iter()
                .filter(|record| filter.matches(record))
                .collect(),
        };

        Ok(records)
    }

    async fn get(&self, id: &DependencyId) -> Result<Option<DependencyRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.records.get(id).cloned())
    }

    async fn save(&self, record: DependencyRecord) -> Result<DependencyRecord> {
        let mut inner = self.inner.lock().await;
        inner.upsert(record.clone());
        Ok(record)
    }

    async fn remove(&self, id: &DependencyId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .take(id)
            .map(|_| ())
            .ok_or(Error::DependencyNotFound(*id))
    }
}
