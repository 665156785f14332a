//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Per-user cash and points balances
//! - `redemption`: Redemption records and their lifecycle
//! - `reward`: Reward catalog
//! - `deposit`: QR deposit payloads and credited deposits
//! - `error`: Error types for the waste bank

pub mod account;
pub mod deposit;
pub mod error;
pub mod redemption;
pub mod reward;

pub use account::Account;
pub use deposit::{DepositPayload, DepositRecord};
pub use error::WasteBankError;
pub use redemption::{RedemptionId, RedemptionRecord, RedemptionStatus};
pub use reward::{Reward, RewardCatalog};

/// User identifier
pub type UserId = String;

/// Owner recorded for actions taken without a signed-in user
pub const GUEST_USER: &str = "guest";
