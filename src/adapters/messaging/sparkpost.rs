use crate::adapters::messaging::{DeliveryReceipt, DispatchError, MessagingProvider};
use crate::config::MessagingConfig;
use crate::domain::payload::OutboundPayload;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
struct TransmissionResponse {
    #[serde(default)]
    results: Option<TransmissionResults>,
}

#[derive(Debug, Default, Deserialize)]
struct TransmissionResults {
    #[serde(default)]
    id: Option<String>,
}

/// Sends transmissions to the SparkPost API (or anything speaking its wire format).
#[derive(Debug, Clone)]
pub struct SparkPostProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl SparkPostProvider {
    /// # Errors
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(config: &MessagingConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, url: config.url.clone(), api_key: config.api_key.clone() })
    }
}

#[async_trait]
impl MessagingProvider for SparkPostProvider {
    #[tracing::instrument(level = "debug", skip_all, err)]
    async fn send(&self, payload: &OutboundPayload) -> Result<DeliveryReceipt, DispatchError> {
        let body = serde_json::to_vec(payload)?;

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await?;
        let parsed = serde_json::from_slice::<TransmissionResponse>(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Provider accepted transmission but returned an unreadable body");
            TransmissionResponse::default()
        });

        let id = parsed.results.and_then(|r| r.id);
        tracing::debug!(delivery_id = ?id, "Transmission accepted");
        Ok(DeliveryReceipt { id })
    }
}
