use crate::adapters::recommendation::{RecommendationError, RecommendationSource};
use crate::config::RecommendationConfig;
use crate::domain::null_as_default;
use crate::domain::recommendation::{Recommendation, RecommendationQuery};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<Recommendation>,
}

/// Client for the Lytics content recommendation API.
#[derive(Debug, Clone)]
pub struct LyticsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LyticsClient {
    /// # Errors
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(config: &RecommendationConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, base_url: config.base_url.clone(), api_key: config.api_key.clone() })
    }

    fn endpoint(&self, query: &RecommendationQuery) -> Result<Url, RecommendationError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| RecommendationError::Endpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| RecommendationError::Endpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "content", "recommend", "user", query.namespace.as_str(), query.recipient.as_str()]);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("shuffle", if query.shuffle { "true" } else { "false" });
            if !query.filter.is_empty() {
                pairs.append_pair("ql", &query.filter);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl RecommendationSource for LyticsClient {
    #[tracing::instrument(level = "debug", skip(self, query), fields(namespace = %query.namespace), err)]
    async fn recommend(&self, query: &RecommendationQuery) -> Result<Vec<Recommendation>, RecommendationError> {
        let url = self.endpoint(query)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendationError::Status { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await?;
        let parsed: RecommendResponse = serde_json::from_slice(&bytes).map_err(RecommendationError::Decode)?;
        tracing::debug!(count = parsed.data.len(), "Received content recommendations");
        Ok(parsed.data)
    }
}
