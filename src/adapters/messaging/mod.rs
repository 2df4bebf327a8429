pub mod sparkpost;

pub use sparkpost::SparkPostProvider;

use crate::domain::payload::OutboundPayload;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to serialize outbound payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Provider responded with status {status}")]
    Rejected { status: u16, body: String },
}

impl DispatchError {
    /// HTTP status reported by the provider, when there was one.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Serialization(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: Option<String>,
}

#[async_trait]
pub trait MessagingProvider: Send + Sync + std::fmt::Debug {
    /// Sends a single transmission. Never retries.
    ///
    /// # Errors
    /// Returns `DispatchError::Rejected` for any non-2xx response from the provider.
    async fn send(&self, payload: &OutboundPayload) -> Result<DeliveryReceipt, DispatchError>;
}
