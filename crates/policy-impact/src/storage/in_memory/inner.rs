//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{DependencyId, DependencyRecord, Policy, PolicyId};
use std::collections::HashMap;

/// Inner storage structure (not thread-safe).
#[derive(Default)]
pub(crate) struct InMemoryStoreInner {
    /// Policies indexed by ID
    pub(super) policies: HashMap<PolicyId, Policy>,

    /// Dependency records indexed by ID
    pub(super) records: HashMap<DependencyId, DependencyRecord>,

    /// Record IDs per owning policy, in insertion order.
    ///
    /// Every ID in `records` appears exactly once here, under its record's
    /// `policy_id`.
    pub(super) by_policy: HashMap<PolicyId, Vec<DependencyId>>,
}

impl InMemoryStoreInner {
    /// Insert or replace a record, keeping the policy index consistent.
    pub(super) fn upsert(&mut self, record: DependencyRecord) {
        match self.records.insert(record.id, record.clone()) {
            Some(previous) if previous.policy_id == record.policy_id => {}
            Some(previous) => {
                self.unindex(&previous.policy_id, &previous.id);
                self.by_policy
                    .entry(record.policy_id)
                    .or_default()
                    .push(record.id);
            }
            None => {
                self.by_policy
                    .entry(record.policy_id)
                    .or_default()
                    .push(record.id);
            }
        }
    }

    /// Remove a record; returns it if it existed.
    pub(super) fn take(&mut self, id: &DependencyId) -> Option<DependencyRecord> {
        let record = self.records.remove(id)?;
        self.unindex(&record.policy_id, id);
        Some(record)
    }

    fn unindex(&mut self, policy_id: &PolicyId, id: &DependencyId) {
        if let Some(ids) = self.by_policy.get_mut(policy_id) {
            ids.retain(|existing| existing != id);
            if ids.is_empty() {
                self.by_policy.remove(policy_id);
            }
        }
    }

    /// Records owned by `policy_id`, in insertion order.
    pub(super) fn records_for_policy(
        &self,
        policy_id: PolicyId,
    ) -> impl Iterator<Item = &DependencyRecord> {
        self.by_policy
            .get(&policy_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.records.get(id))
    }

    /// Every record, grouped by policy and in insertion order within a policy.
    pub(super) fn all_records(&self) -> Vec<DependencyRecord> {
        let mut policy_ids: Vec<&PolicyId> = self.by_policy.keys().collect();
        policy_ids.sort();
        policy_ids
            .into_iter()
            .flat_map(|policy_id| self.records_for_policy(*policy_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyMetadata, DependencyStrength, DependentType, EntityId};
    use chrono::Utc;

    fn record(policy_id: PolicyId) -> DependencyRecord {
        let now = Utc::now();
        DependencyRecord {
            id: DependencyId::new(),
            policy_id,
            dependent_type: DependentType::Document,
            dependent_id: EntityId::new(),
            strength: DependencyStrength::Weak,
            metadata: DependencyMetadata::default(),
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_upsert_moves_index_when_policy_changes() {
        let mut inner = InMemoryStoreInner::default();
        let first = PolicyId::new();
        let second = PolicyId::new();

        let mut rec = record(first);
        inner.upsert(rec.clone());
        rec.policy_id = second;
        inner.upsert(rec.clone());

        assert_eq!(inner.records_for_policy(first).count(), 0);
        assert_eq!(inner.records_for_policy(second).count(), 1);
        assert!(!inner.by_policy.contains_key(&first));
    }

    #[test]
    fn test_take_removes_from_index() {
        let mut inner = InMemoryStoreInner::default();
        let policy = PolicyId::new();
        let rec = record(policy);
        inner.upsert(rec.clone());

        assert!(inner.take(&rec.id).is_some());
        assert!(inner.take(&rec.id).is_none());
        assert_eq!(inner.records_for_policy(policy).count(), 0);
    }
}
