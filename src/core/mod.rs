//! Core business logic module
//!
//! This module contains the ledger components:
//! - `engine` - `WasteBank` orchestration of redemptions, deposits and withdrawals
//! - `account_manager` - Per-user cash and points balances
//! - `redemption_store` - Flat list of redemption records
//! - `deposit_log` - Claimed deposit codes

pub mod account_manager;
pub mod deposit_log;
pub mod engine;
pub mod redemption_store;

pub use account_manager::AccountManager;
pub use deposit_log::DepositLog;
pub use engine::{RedeemOutcome, SyncReport, WasteBank};
pub use redemption_store::RedemptionStore;
