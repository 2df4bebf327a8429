use crate::adapters::messaging::MessagingProvider;
use crate::adapters::recommendation::{RecommendationError, RecommendationSource};
use crate::config::Config;
use crate::domain::event::InboundEvent;
use crate::domain::filter::FilterCriteria;
use crate::domain::payload;
use crate::domain::recommendation::{RecommendationQuery, compose_filter};
use crate::domain::schedule;
use crate::error::{PipelineError, PipelineResult, Result};
use opentelemetry::{KeyValue, global, metrics::Counter, metrics::Histogram};
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    outcomes: Counter<u64>,
    upstream_duration: Histogram<f64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("lifecycle-enricher");
        Self {
            outcomes: meter
                .u64_counter("enrich_outcomes_total")
                .with_description("Webhook invocations by terminal outcome")
                .build(),
            upstream_duration: meter
                .f64_histogram("enrich_upstream_duration_seconds")
                .with_description("Latency of calls to the recommendation service and messaging provider")
                .with_unit("s")
                .build(),
        }
    }
}

/// Immutable per-process settings the pipeline reads on every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    pub criteria: FilterCriteria,
    pub template_id: String,
    pub optimal_hour: bool,
    pub namespace: String,
    pub filter_expression: String,
    pub limit: u32,
    pub shuffle: bool,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            criteria: FilterCriteria::from(&config.filter),
            template_id: config.messaging.template_id.clone(),
            optimal_hour: config.schedule.optimal_hour,
            namespace: config.recommendation.namespace.clone(),
            filter_expression: compose_filter(&config.recommendation.filter),
            limit: config.recommendation.limit,
            shuffle: config.recommendation.shuffle,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnrichmentService {
    settings: Arc<PipelineSettings>,
    recommendations: Arc<dyn RecommendationSource>,
    messaging: Arc<dyn MessagingProvider>,
    metrics: Metrics,
}

impl EnrichmentService {
    #[must_use]
    pub fn new(
        settings: PipelineSettings,
        recommendations: Arc<dyn RecommendationSource>,
        messaging: Arc<dyn MessagingProvider>,
    ) -> Self {
        Self { settings: Arc::new(settings), recommendations, messaging, metrics: Metrics::new() }
    }

    /// Runs one webhook body through the pipeline and always produces a terminal result.
    #[tracing::instrument(
        skip(self, body, now),
        fields(event = tracing::field::Empty, outcome = tracing::field::Empty, status = tracing::field::Empty)
    )]
    pub async fn process(&self, body: &[u8], now: OffsetDateTime) -> PipelineResult {
        let result = self.run(body, now).await.unwrap_or_else(PipelineResult::from);

        let span = tracing::Span::current();
        span.record("outcome", result.outcome());
        span.record("status", result.status().as_u16());
        self.metrics.outcomes.add(1, &[KeyValue::new("outcome", result.outcome())]);

        match &result {
            PipelineResult::Success { delivery_id } => tracing::info!(delivery_id = ?delivery_id, "Webhook enriched and sent"),
            PipelineResult::Rejected { reason, .. } => tracing::debug!(reason, "Webhook skipped"),
            PipelineResult::Failed { .. } => {}
        }
        result
    }

    async fn run(&self, body: &[u8], now: OffsetDateTime) -> Result<PipelineResult> {
        let event = InboundEvent::decode(body)?;
        tracing::Span::current().record("event", event.name.as_str());

        if let Some(rejection) = PipelineResult::from_filter(self.settings.criteria.matches(&event)?) {
            return Ok(rejection);
        }

        let recipient = event.email()?.ok_or(PipelineError::MissingRecipient)?;
        let hourly = if self.settings.optimal_hour { event.hourly_activity()? } else { None };

        let query = RecommendationQuery {
            namespace: self.settings.namespace.clone(),
            recipient: recipient.to_string(),
            filter: self.settings.filter_expression.clone(),
            limit: self.settings.limit,
            shuffle: self.settings.shuffle,
        };
        let started = Instant::now();
        let lookup = self.recommendations.recommend(&query).await;
        self.record_upstream("recommendation", started);
        let top = lookup?.into_iter().next().ok_or(RecommendationError::Empty)?;

        let start_time = hourly.and_then(|hourly| schedule::estimate(&hourly, now));
        tracing::debug!(start_time = ?start_time, "Estimated delivery time");

        let payload = payload::build(recipient, &top, &self.settings.template_id, start_time);

        let started = Instant::now();
        let sent = self.messaging.send(&payload).await;
        self.record_upstream("messaging", started);
        let receipt = sent?;

        Ok(PipelineResult::Success { delivery_id: receipt.id })
    }

    fn record_upstream(&self, target: &'static str, started: Instant) {
        self.metrics.upstream_duration.record(started.elapsed().as_secs_f64(), &[KeyValue::new("target", target)]);
    }
}
