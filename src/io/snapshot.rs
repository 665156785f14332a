//! Persisted form of the ledger
//!
//! The whole ledger is written as one document on every change. Redemption
//! records for all users live together in one flat list.

use crate::types::{Account, DepositRecord, RedemptionRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub redemptions: Vec<RedemptionRecord>,
    #[serde(default)]
    pub deposits: Vec<DepositRecord>,
}

impl Snapshot {
    /// Parse a snapshot document
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Render the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = Snapshot::from_json(br#"{"accounts": []}"#).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_rejects_malformed_document() {
        assert!(Snapshot::from_json(b"{not json").is_err());
    }
}
