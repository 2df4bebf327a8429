pub mod lytics;

pub use lytics::LyticsClient;

use crate::domain::recommendation::{Recommendation, RecommendationQuery};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Recommendation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Recommendation service responded with status {status}")]
    Status { status: u16, body: String },
    #[error("Invalid recommendation response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Invalid recommendation endpoint: {0}")]
    Endpoint(String),
    #[error("No recommendations returned")]
    Empty,
}

#[async_trait]
pub trait RecommendationSource: Send + Sync + std::fmt::Debug {
    /// Fetches ranked content recommendations for a single user, best first.
    ///
    /// # Errors
    /// Returns a `RecommendationError` if the lookup cannot be completed.
    async fn recommend(&self, query: &RecommendationQuery) -> Result<Vec<Recommendation>, RecommendationError>;
}
