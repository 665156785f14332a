//! Waste Bank Library
//! # Overview
//!
//! This library implements the ledger behind a digital waste bank: users
//! deposit recyclable waste, accrue cash and points, withdraw cash and redeem
//! points for rewards settled by a remote order-processing service.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, RedemptionRecord, Reward, etc.)
//! - [`cli`] - CLI arguments parsing and command dispatch
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - `WasteBank` orchestration
//!   - [`core::account_manager`] - Balance management with per-account locking
//!   - [`core::redemption_store`] - Redemption records and their transitions
//!   - [`core::deposit_log`] - Single-use deposit codes
//! - [`gateway`] - Remote redemption service client
//! - [`io`] - Ledger persistence
//!
//! # Redemption Lifecycle
//!
//! - **Redeem**: debit points, append a `pending` record (no network)
//! - **Reconcile**: one remote call moves the record to `completed` or `failed`;
//!   a transport failure leaves it `pending`
//! - **Sync**: one batch call for every pending record, falling back to one
//!   reconcile per record when the batch call fails
//!
//! Points are never re-credited, even when the service rejects a redemption.

// Module declarations
pub mod cli;
pub mod core;
pub mod gateway;
pub mod io;
pub mod types;

pub use core::{RedeemOutcome, SyncReport, WasteBank};
pub use gateway::{GatewayConfig, HttpGateway, RedemptionGateway};
pub use io::{JsonFileStore, MemoryStore, Snapshot, SnapshotStore};
pub use types::{
    Account, DepositPayload, DepositRecord, RedemptionId, RedemptionRecord, RedemptionStatus,
    Reward, RewardCatalog, UserId, WasteBankError,
};
