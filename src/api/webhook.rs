use crate::api::AppState;
use crate::error::PipelineResult;
use axum::{body::Bytes, extract::State};
use time::OffsetDateTime;

/// Receives an audience lifecycle webhook and runs it through the enrichment pipeline.
///
/// The response status and the `status` field of the JSON body always agree.
pub async fn receive_event(State(state): State<AppState>, body: Bytes) -> PipelineResult {
    state.enrichment_service.process(&body, OffsetDateTime::now_utc()).await
}
