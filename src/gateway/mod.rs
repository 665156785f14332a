//! Remote order-processing gateway
//!
//! Redemptions are settled by an external service reached over HTTP:
//!
//! - `POST /api/redemptions` settles one record
//! - `POST /api/redemptions/batch` reports which of a list of ids are processed
//! - `GET /api/health` liveness probe
//!
//! The [`RedemptionGateway`] trait is the seam between the ledger and the
//! network so tests can swap the HTTP client for a scripted one. Every
//! implementation must map network errors, timeouts, non-2xx statuses and
//! undecodable bodies to [`WasteBankError::Transport`].

pub mod config;
pub mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use config::GatewayConfig;
pub use http::HttpGateway;

use crate::types::{RedemptionRecord, WasteBankError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REDEMPTIONS_PATH: &str = "/api/redemptions";
pub const BATCH_PATH: &str = "/api/redemptions/batch";
pub const HEALTH_PATH: &str = "/api/health";

/// Body of `POST /api/redemptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub reward_name: String,
    pub points: u64,
    pub date: DateTime<Utc>,
}

impl From<&RedemptionRecord> for RedemptionRequest {
    fn from(record: &RedemptionRecord) -> Self {
        RedemptionRequest {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            reward_id: record.reward_id.clone(),
            reward_name: record.reward_name.clone(),
            points: record.points,
            date: record.date,
        }
    }
}

/// Response of `POST /api/redemptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResponse {
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
    /// ISO-8601 settlement time; kept as text so a malformed value only
    /// loses the timestamp, not the disposition
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl RedemptionResponse {
    /// Settlement time reported by the server, if present and well-formed
    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
            .as_deref()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|at| at.with_timezone(&Utc))
    }
}

/// Body of `POST /api/redemptions/batch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<String>,
}

/// Response of `POST /api/redemptions/batch`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Ids the server considers processed
    #[serde(default)]
    pub processed: Vec<String>,
}

/// Client for the remote order-processing service
#[async_trait]
pub trait RedemptionGateway: Send + Sync {
    /// Settle a single redemption
    async fn submit(&self, request: &RedemptionRequest)
        -> Result<RedemptionResponse, WasteBankError>;

    /// Ask which of `ids` have been processed
    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse, WasteBankError>;
}
