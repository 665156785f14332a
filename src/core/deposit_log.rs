//! Claimed deposit codes
//!
//! Each deposit QR code may be credited once. The log keeps every credited
//! deposit keyed by its code so a second scan is rejected.

use crate::types::{DepositRecord, WasteBankError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct DepositLog {
    deposits: DashMap<String, DepositRecord>,
}

impl DepositLog {
    pub fn new() -> Self {
        Self {
            deposits: DashMap::new(),
        }
    }

    /// Rebuild the log from persisted deposits
    pub fn from_records(records: impl IntoIterator<Item = DepositRecord>) -> Self {
        Self {
            deposits: records
                .into_iter()
                .map(|record| (record.code.clone(), record))
                .collect(),
        }
    }

    /// Record `deposit` if its code is unclaimed, running `credit` first
    ///
    /// The code's entry stays locked while `credit` runs, so two scans of the
    /// same code cannot both be credited. If `credit` fails nothing is logged.
    pub fn claim<T, F>(&self, deposit: DepositRecord, credit: F) -> Result<T, WasteBankError>
    where
        F: FnOnce(&DepositRecord) -> Result<T, WasteBankError>,
    {
        match self.deposits.entry(deposit.code.clone()) {
            Entry::Occupied(existing) => Err(WasteBankError::duplicate_deposit(
                &deposit.code,
                &existing.get().user_id,
            )),
            Entry::Vacant(slot) => {
                let credited = credit(&deposit)?;
                slot.insert(deposit);
                Ok(credited)
            }
        }
    }

    /// Forget a claimed code whose credit was rolled back
    pub fn release(&self, code: &str) -> Option<DepositRecord> {
        self.deposits.remove(code).map(|(_, record)| record)
    }

    /// All deposits ordered by date
    pub fn all(&self) -> Vec<DepositRecord> {
        let mut records: Vec<DepositRecord> = self
            .deposits
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.code.cmp(&b.code)));
        records
    }
}
