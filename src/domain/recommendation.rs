use crate::domain::null_as_default;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FROM_CLAUSE: &str = "FROM content";

/// A ranked content document suggested for a user.
///
/// Fields the enricher does not use are kept verbatim in `extra` so templates can reference
/// anything the recommendation service returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visited: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    /// User field the recipient identifier belongs to, e.g. `emails`.
    pub namespace: String,
    pub recipient: String,
    pub filter: String,
    pub limit: u32,
    pub shuffle: bool,
}

/// Normalizes a content filter into a complete query statement.
///
/// Blank input means "no filter". Anything else is trimmed and terminated with
/// `FROM content` unless it already ends with it.
#[must_use]
pub fn compose_filter(expression: &str) -> String {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.to_ascii_lowercase().ends_with(&FROM_CLAUSE.to_ascii_lowercase()) {
        return trimmed.to_string();
    }
    format!("{trimmed} {FROM_CLAUSE}")
}
