//! I/O module
//!
//! Handles loading and saving the ledger.
//!
//! # Components
//!
//! - `snapshot` - The persisted form of the whole ledger
//! - `store` - `SnapshotStore` trait with JSON file and in-memory backends

pub mod snapshot;
pub mod store;

pub use snapshot::Snapshot;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
