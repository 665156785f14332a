//! Redemption record storage
//!
//! This module provides the `RedemptionStore`, the flat list of every
//! redemption for every user. Records are appended once and afterwards only
//! change through [`RedemptionStore::settle`], which moves a pending record to
//! a terminal state.
//!
//! The engine can take back its own latest change when the ledger fails to
//! save: [`RedemptionStore::remove`] drops a record it just appended and
//! [`RedemptionStore::reopen`] returns a record it just settled to `pending`.
//!
//! # Duplicate Handling
//!
//! If a record with an already known ID is inserted, only the first occurrence
//! is kept.

use crate::types::{RedemptionRecord, RedemptionStatus, WasteBankError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Thread-safe redemption record store keyed by redemption ID
#[derive(Debug, Default)]
pub struct RedemptionStore {
    records: DashMap<String, RedemptionRecord>,
}

impl RedemptionStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Rebuild the store from persisted records
    pub fn from_records(records: impl IntoIterator<Item = RedemptionRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Append a record (first occurrence of an ID wins)
    pub fn insert(&self, record: RedemptionRecord) {
        self.records.entry(record.id.clone()).or_insert(record);
    }

    /// Get a snapshot of a record by ID
    pub fn get(&self, id: &str) -> Option<RedemptionRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    /// Move a pending record to `status`
    ///
    /// Terminal records are never modified. The returned flag tells whether
    /// this call performed the transition.
    ///
    /// # Arguments
    ///
    /// * `id` - The redemption to settle
    /// * `status` - Target state, `Completed` or `Failed`
    /// * `at` - Settlement time stored as `completed_at`
    ///
    /// # Returns
    ///
    /// * `Ok((record, true))` - The record was pending and is now terminal
    /// * `Ok((record, false))` - The record was already terminal and is unchanged
    /// * `Err(WasteBankError)` - The ID is unknown
    pub fn settle(
        &self,
        id: &str,
        status: RedemptionStatus,
        at: DateTime<Utc>,
    ) -> Result<(RedemptionRecord, bool), WasteBankError> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| WasteBankError::redemption_not_found(id))?;
        let changed = entry.value_mut().settle(status, at);
        Ok((entry.value().clone(), changed))
    }

    /// All records ordered by creation date
    pub fn all(&self) -> Vec<RedemptionRecord> {
        self.collect_sorted(|_| true)
    }

    /// Records owned by one user, ordered by creation date
    pub fn for_user(&self, user_id: &str) -> Vec<RedemptionRecord> {
        self.collect_sorted(|record| record.user_id == user_id)
    }

    /// Pending records ordered by creation date
    pub fn pending(&self) -> Vec<RedemptionRecord> {
        self.collect_sorted(RedemptionRecord::is_pending)
    }

    /// Drop a record that was appended but could not be saved
    pub fn remove(&self, id: &str) -> Option<RedemptionRecord> {
        self.records.remove(id).map(|(_, record)| record)
    }

    /// Put back the pending state of a record whose settlement could not be saved
    ///
    /// Only a record that is currently terminal is replaced, and only by a
    /// pending snapshot with the same ID.
    ///
    /// # Returns
    ///
    /// `true` if the record is pending again
    pub fn reopen(&self, pending: &RedemptionRecord) -> bool {
        if !pending.is_pending() {
            return false;
        }
        match self.records.get_mut(&pending.id) {
            Some(mut entry) if entry.value().status.is_terminal() => {
                *entry.value_mut() = pending.clone();
                true
            }
            _ => false,
        }
    }

    fn collect_sorted<P>(&self, predicate: P) -> Vec<RedemptionRecord>
    where
        P: Fn(&RedemptionRecord) -> bool,
    {
        let mut records: Vec<RedemptionRecord> = self
            .records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        records
    }
}
