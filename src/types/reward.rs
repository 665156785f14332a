//! Reward catalog types

use super::WasteBankError;
use serde::{Deserialize, Serialize};

/// A catalog entry that can be bought with points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub name: String,
    /// Point cost
    pub points: u64,
}

impl Reward {
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: u64) -> Self {
        Reward {
            id: id.into(),
            name: name.into(),
            points,
        }
    }
}

/// Static list of redeemable rewards
#[derive(Debug, Clone)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    pub fn new(rewards: Vec<Reward>) -> Self {
        RewardCatalog { rewards }
    }

    /// Look up a reward by id
    pub fn get(&self, id: &str) -> Result<&Reward, WasteBankError> {
        self.rewards
            .iter()
            .find(|reward| reward.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| WasteBankError::reward_not_found(id))
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }
}

impl Default for RewardCatalog {
    fn default() -> Self {
        RewardCatalog::new(vec![
            Reward::new("R001", "Voucher Pulsa 10k", 1000),
            Reward::new("R002", "Voucher Belanja 25k", 2000),
            Reward::new("R003", "Tumbler Ramah Lingkungan", 3500),
            Reward::new("R004", "Tas Belanja Kain", 1500),
            Reward::new("R005", "Bibit Tanaman", 500),
            Reward::new("R006", "Voucher Listrik 50k", 5000),
        ])
    }
}
