#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::messaging::{MessagingProvider, SparkPostProvider};
use crate::adapters::recommendation::{LyticsClient, RecommendationSource};
use crate::config::Config;
use crate::services::enrichment_service::{EnrichmentService, PipelineSettings};
use std::sync::Arc;
use tokio::sync::watch;

/// Wired application components, ready to be mounted on a router.
#[derive(Debug)]
pub struct App {
    pub enrichment_service: EnrichmentService,
}

impl App {
    #[must_use]
    pub fn state(&self) -> api::AppState {
        api::AppState { enrichment_service: self.enrichment_service.clone() }
    }
}

/// Builds the application from configuration. Collaborators default to the HTTP clients
/// described by the config and can be swapped out (e.g. in tests).
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    recommendations: Option<Arc<dyn RecommendationSource>>,
    messaging: Option<Arc<dyn MessagingProvider>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, recommendations: None, messaging: None }
    }

    #[must_use]
    pub fn with_recommendation_source(mut self, source: Arc<dyn RecommendationSource>) -> Self {
        self.recommendations = Some(source);
        self
    }

    #[must_use]
    pub fn with_messaging_provider(mut self, provider: Arc<dyn MessagingProvider>) -> Self {
        self.messaging = Some(provider);
        self
    }

    /// # Errors
    /// Returns an error if a default HTTP client cannot be constructed.
    pub fn build(self) -> anyhow::Result<App> {
        let recommendations = match self.recommendations {
            Some(source) => source,
            None => Arc::new(LyticsClient::new(&self.config.recommendation)?),
        };
        let messaging = match self.messaging {
            Some(provider) => provider,
            None => Arc::new(SparkPostProvider::new(&self.config.messaging)?),
        };

        let settings = PipelineSettings::from_config(&self.config);
        tracing::info!(
            event_filter = ?settings.criteria.event_name,
            segment_filter = ?settings.criteria.segment_name,
            optimal_hour = settings.optimal_hour,
            "Enrichment pipeline configured"
        );

        Ok(App { enrichment_service: EnrichmentService::new(settings, recommendations, messaging) })
    }
}

/// Routes panics through tracing so they end up in the same sink as every other log line.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "Panic occurred");
    }));
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}
