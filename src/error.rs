use crate::adapters::messaging::DispatchError;
use crate::adapters::recommendation::RecommendationError;
use crate::api::schemas::webhook::WebhookResponse;
use crate::domain::event::EventError;
use crate::domain::filter::MatchOutcome;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const MSG_SUCCESS: &str = "success";
pub const MSG_UNRECOGNIZED_BODY: &str = "unrecognized webhook body";
pub const MSG_EVENT_NAME_MISMATCH: &str = "not processed: event name did not match";
pub const MSG_SEGMENT_NAME_MISMATCH: &str = "not processed: segment name did not match";
pub const MSG_MISSING_EMAIL: &str = "user does not have email";
pub const MSG_NO_RECOMMENDATION: &str = "could not get recommendation for this user";
pub const MSG_INVALID_OUTGOING_BODY: &str = "invalid outgoing webhook body";
pub const MSG_SEND_FAILED: &str = "could not send webhook";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed event: {0}")]
    MalformedEvent(#[from] EventError),
    #[error("Event has no recipient address")]
    MissingRecipient,
    #[error("Recommendation lookup failed: {0}")]
    RecommendationFailure(#[from] RecommendationError),
    #[error("Payload serialization failed: {0}")]
    PayloadSerializationFailure(#[source] serde_json::Error),
    #[error("Dispatch failed: {0}")]
    DispatchFailure(#[source] DispatchError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<DispatchError> for PipelineError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Serialization(e) => Self::PayloadSerializationFailure(e),
            other => Self::DispatchFailure(other),
        }
    }
}

/// Terminal outcome of one webhook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    Success { delivery_id: Option<String> },
    Rejected { reason: &'static str, status: StatusCode },
    Failed { reason: &'static str, status: StatusCode },
}

impl PipelineResult {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Success { .. } => StatusCode::OK,
            Self::Rejected { status, .. } | Self::Failed { status, .. } => *status,
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success { .. } => MSG_SUCCESS,
            Self::Rejected { reason, .. } | Self::Failed { reason, .. } => *reason,
        }
    }

    #[must_use]
    pub fn delivery_id(&self) -> Option<&str> {
        match self {
            Self::Success { delivery_id } => delivery_id.as_deref(),
            _ => None,
        }
    }

    /// Short label used for metrics.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
        }
    }

    /// Maps a filter decision to a rejection. `Matched` is not a terminal state.
    #[must_use]
    pub const fn from_filter(outcome: MatchOutcome) -> Option<Self> {
        match outcome {
            MatchOutcome::Matched => None,
            MatchOutcome::RejectedEventName => {
                Some(Self::Rejected { reason: MSG_EVENT_NAME_MISMATCH, status: StatusCode::NO_CONTENT })
            }
            MatchOutcome::RejectedSegmentName => {
                Some(Self::Rejected { reason: MSG_SEGMENT_NAME_MISMATCH, status: StatusCode::NO_CONTENT })
            }
        }
    }

    #[must_use]
    pub fn to_body(&self) -> WebhookResponse {
        WebhookResponse {
            status: self.status().as_u16(),
            message: self.message().to_string(),
            id: self.delivery_id().map(str::to_string),
        }
    }
}

impl From<PipelineError> for PipelineResult {
    fn from(err: PipelineError) -> Self {
        let (reason, status) = match &err {
            PipelineError::MalformedEvent(e) => {
                tracing::warn!(error = %e, "Unrecognized webhook body");
                (MSG_UNRECOGNIZED_BODY, StatusCode::INTERNAL_SERVER_ERROR)
            }
            PipelineError::MissingRecipient => {
                tracing::debug!("Event has no email property");
                (MSG_MISSING_EMAIL, StatusCode::BAD_REQUEST)
            }
            PipelineError::RecommendationFailure(e) => {
                tracing::error!(error = %e, "Recommendation lookup failed");
                (MSG_NO_RECOMMENDATION, StatusCode::INTERNAL_SERVER_ERROR)
            }
            PipelineError::PayloadSerializationFailure(e) => {
                tracing::error!(error = %e, "Failed to serialize outbound payload");
                (MSG_INVALID_OUTGOING_BODY, StatusCode::INTERNAL_SERVER_ERROR)
            }
            PipelineError::DispatchFailure(e) => {
                tracing::error!(error = %e, upstream_status = ?e.upstream_status(), "Dispatch to messaging provider failed");
                (MSG_SEND_FAILED, StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
        Self::Failed { reason, status }
    }
}

impl IntoResponse for PipelineResult {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.to_body())).into_response();

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST"));

        response
    }
}
