//! Scripted gateway for unit tests

use super::{BatchRequest, BatchResponse, RedemptionGateway, RedemptionRequest, RedemptionResponse};
use super::{BATCH_PATH, REDEMPTIONS_PATH};
use crate::types::WasteBankError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How `submit` answers
#[derive(Debug, Clone)]
pub enum SingleMode {
    Accept { processed_at: Option<String> },
    Reject,
    Unreachable,
}

/// How `submit_batch` answers
#[derive(Debug, Clone)]
pub enum BatchMode {
    /// Report every requested id as processed
    ProcessAll,
    /// Report only these ids
    Process(Vec<String>),
    Unreachable,
}

#[derive(Debug)]
pub struct ScriptedGateway {
    single: Mutex<SingleMode>,
    batch: Mutex<BatchMode>,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(single: SingleMode, batch: BatchMode) -> Self {
        Self {
            single: Mutex::new(single),
            batch: Mutex::new(batch),
            single_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn accepting() -> Self {
        Self::new(
            SingleMode::Accept { processed_at: None },
            BatchMode::ProcessAll,
        )
    }

    pub fn unreachable() -> Self {
        Self::new(SingleMode::Unreachable, BatchMode::Unreachable)
    }

    pub fn set_single(&self, mode: SingleMode) {
        *self.single.lock().unwrap() = mode;
    }

    pub fn set_batch(&self, mode: BatchMode) {
        *self.batch.lock().unwrap() = mode;
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RedemptionGateway for ScriptedGateway {
    async fn submit(
        &self,
        request: &RedemptionRequest,
    ) -> Result<RedemptionResponse, WasteBankError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        let mode = self.single.lock().unwrap().clone();
        match mode {
            SingleMode::Accept { processed_at } => Ok(RedemptionResponse {
                success: true,
                id: Some(request.id.clone()),
                processed_at,
            }),
            SingleMode::Reject => Ok(RedemptionResponse {
                success: false,
                id: Some(request.id.clone()),
                processed_at: None,
            }),
            SingleMode::Unreachable => Err(WasteBankError::transport(
                REDEMPTIONS_PATH,
                "connection refused",
            )),
        }
    }

    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse, WasteBankError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mode = self.batch.lock().unwrap().clone();
        match mode {
            BatchMode::ProcessAll => Ok(BatchResponse {
                processed: request.ids.clone(),
            }),
            BatchMode::Process(ids) => Ok(BatchResponse { processed: ids }),
            BatchMode::Unreachable => {
                Err(WasteBankError::transport(BATCH_PATH, "connection refused"))
            }
        }
    }
}
