//! Redemption-related types for the waste bank
//!
//! A redemption exchanges accumulated points for a catalog reward. Points are
//! debited when the record is created; the record then waits in `pending`
//! until the remote order-processing service settles it.

use super::{Reward, UserId, WasteBankError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Redemption identifier
///
/// Generated locally at creation time.
pub type RedemptionId = String;

/// Lifecycle state of a redemption
///
/// ```text
/// pending --success=true--> completed
/// pending --success=false-> failed
/// pending --transport failure--> pending
/// ```
///
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    /// Points debited, remote disposition unknown
    Pending,

    /// Remote service accepted the redemption
    Completed,

    /// Remote service refused the redemption
    ///
    /// Points stay debited.
    Failed,
}

impl RedemptionStatus {
    /// Whether no further transitions are allowed
    pub fn is_terminal(self) -> bool {
        !matches!(self, RedemptionStatus::Pending)
    }
}

impl std::fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Completed => "completed",
            RedemptionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One attempt to exchange points for a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub id: RedemptionId,
    pub user_id: UserId,
    pub reward_id: String,
    pub reward_name: String,

    /// Point cost debited at creation; immutable afterwards
    pub points: u64,

    /// Creation timestamp
    pub date: DateTime<Utc>,

    pub status: RedemptionStatus,

    /// Set only on the transition to a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl RedemptionRecord {
    /// Create a new pending record for `reward` with a fresh id
    pub fn pending(user_id: impl Into<UserId>, reward: &Reward, date: DateTime<Utc>) -> Self {
        RedemptionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            reward_id: reward.id.clone(),
            reward_name: reward.name.clone(),
            points: reward.points,
            date,
            status: RedemptionStatus::Pending,
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RedemptionStatus::Pending
    }

    /// Move a pending record to a terminal state
    ///
    /// Returns `false` and leaves the record untouched if it is already
    /// terminal or if `status` is `Pending`.
    pub fn settle(&mut self, status: RedemptionStatus, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.completed_at = Some(at);
        true
    }

    /// The rejection notice for a failed record, if any
    pub fn rejection(&self) -> Option<WasteBankError> {
        (self.status == RedemptionStatus::Failed)
            .then(|| WasteBankError::server_rejection(&self.id))
    }
}
