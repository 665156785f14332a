//! Snapshot storage backends
//!
//! - [`JsonFileStore`] keeps the ledger in a JSON document on disk. Each save
//!   writes a sibling temp file and renames it over the original, so a crash
//!   mid-write leaves the previous snapshot intact.
//! - [`MemoryStore`] keeps the last saved snapshot in memory.

use super::Snapshot;
use crate::types::WasteBankError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Durable home of the ledger
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot; an empty ledger if nothing was saved yet
    async fn load(&self) -> Result<Snapshot, WasteBankError>;

    /// Replace the saved snapshot
    async fn save(&self, snapshot: &Snapshot) -> Result<(), WasteBankError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot, WasteBankError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Snapshot::from_json(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                Ok(Snapshot::default())
            }
            Err(e) => Err(WasteBankError::storage(format!(
                "cannot read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), WasteBankError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = snapshot.to_json()?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            redemptions = snapshot.redemptions.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Snapshot>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed saves
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the last saved snapshot
    pub fn current(&self) -> Snapshot {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Snapshot, WasteBankError> {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| WasteBankError::storage(e.to_string()))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), WasteBankError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| WasteBankError::storage(e.to_string()))?;
        *guard = snapshot.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
