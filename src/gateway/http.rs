//! HTTP implementation of [`RedemptionGateway`] backed by reqwest

use super::{
    BatchRequest, BatchResponse, GatewayConfig, RedemptionGateway, RedemptionRequest,
    RedemptionResponse, BATCH_PATH, HEALTH_PATH, REDEMPTIONS_PATH,
};
use crate::types::WasteBankError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a client whose every request is bounded by `config.timeout`
    pub fn new(config: GatewayConfig) -> Result<Self, WasteBankError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WasteBankError::transport(&config.base_url, e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Probe `GET /api/health`
    pub async fn health(&self) -> Result<(), WasteBankError> {
        let response = self
            .client
            .get(self.config.endpoint(HEALTH_PATH))
            .send()
            .await
            .map_err(|e| self.transport_error(HEALTH_PATH, e))?;

        if !response.status().is_success() {
            return Err(WasteBankError::transport(
                HEALTH_PATH,
                format!("HTTP {}", response.status()),
            ));
        }
        Ok(())
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, WasteBankError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WasteBankError::transport(path, format!("HTTP {}", status)));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| WasteBankError::transport(path, format!("undecodable response: {}", e)))
    }

    fn transport_error(&self, path: &str, error: reqwest::Error) -> WasteBankError {
        if error.is_timeout() {
            WasteBankError::transport(
                path,
                format!("timed out after {} ms", self.config.timeout.as_millis()),
            )
        } else {
            WasteBankError::transport(path, error.to_string())
        }
    }
}

#[async_trait]
impl RedemptionGateway for HttpGateway {
    async fn submit(
        &self,
        request: &RedemptionRequest,
    ) -> Result<RedemptionResponse, WasteBankError> {
        self.post_json(REDEMPTIONS_PATH, request).await
    }

    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse, WasteBankError> {
        self.post_json(BATCH_PATH, request).await
    }
}
