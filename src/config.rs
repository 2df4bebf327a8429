use clap::{ArgAction, Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub recommendation: RecommendationConfig,

    #[command(flatten)]
    pub messaging: MessagingConfig,

    #[command(flatten)]
    pub filter: FilterConfig,

    #[command(flatten)]
    pub schedule: ScheduleConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "ENRICHER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the webhook listener
    #[arg(long, env = "ENRICHER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the management listener (health probes)
    #[arg(long, env = "ENRICHER_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for in-flight requests to drain on shutdown
    #[arg(long, env = "ENRICHER_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080, mgmt_port: 9090, shutdown_timeout_secs: 5 }
    }
}

#[derive(Clone, Debug, Args)]
pub struct RecommendationConfig {
    /// API key for the content recommendation service
    #[arg(id = "recommendation_api_key", long = "recommendation-api-key", env = "ENRICHER_RECOMMENDATION_API_KEY")]
    pub api_key: String,

    /// Base URL of the content recommendation service
    #[arg(long = "recommendation-base-url", env = "ENRICHER_RECOMMENDATION_BASE_URL", default_value = "https://api.lytics.io")]
    pub base_url: String,

    /// User field the recipient identifier is looked up by
    #[arg(long = "recommendation-namespace", env = "ENRICHER_RECOMMENDATION_NAMESPACE", default_value = "emails")]
    pub namespace: String,

    /// Number of recommendations to request
    #[arg(long = "recommendation-limit", env = "ENRICHER_RECOMMENDATION_LIMIT", default_value_t = 3)]
    pub limit: u32,

    /// Ask the service to shuffle ranked results
    #[arg(long = "recommendation-shuffle", env = "ENRICHER_RECOMMENDATION_SHUFFLE", default_value_t = false, action = ArgAction::Set)]
    pub shuffle: bool,

    /// Content filter expression, e.g. `FILTER AND (url LIKE "www.example.com/*") FROM content`
    #[arg(long = "recommendation-filter", env = "ENRICHER_RECOMMENDATION_FILTER", default_value = "")]
    pub filter: String,

    /// Transport timeout for recommendation lookups
    #[arg(id = "recommendation_timeout_secs", long = "recommendation-timeout-secs", env = "ENRICHER_RECOMMENDATION_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.lytics.io".to_string(),
            namespace: "emails".to_string(),
            limit: 3,
            shuffle: false,
            filter: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct MessagingConfig {
    /// API key sent verbatim in the Authorization header
    #[arg(id = "messaging_api_key", long = "messaging-api-key", env = "ENRICHER_MESSAGING_API_KEY")]
    pub api_key: String,

    /// Transmission endpoint of the messaging provider
    #[arg(
        long = "messaging-url",
        env = "ENRICHER_MESSAGING_URL",
        default_value = "https://api.sparkpost.com/api/v1/transmissions"
    )]
    pub url: String,

    /// Template the provider renders the recommendation into
    #[arg(long = "messaging-template-id", env = "ENRICHER_MESSAGING_TEMPLATE_ID")]
    pub template_id: String,

    /// Transport timeout for dispatch calls
    #[arg(id = "messaging_timeout_secs", long = "messaging-timeout-secs", env = "ENRICHER_MESSAGING_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: "https://api.sparkpost.com/api/v1/transmissions".to_string(),
            template_id: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Which lifecycle events get processed. Leave both unset to accept everything.
#[derive(Clone, Debug, Default, Args)]
pub struct FilterConfig {
    /// Only process events with this name (e.g. `segment_entered`)
    #[arg(long = "filter-event-name", env = "ENRICHER_FILTER_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Only process events for this segment
    #[arg(long = "filter-segment-name", env = "ENRICHER_FILTER_SEGMENT_NAME")]
    pub segment_name: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ScheduleConfig {
    /// Schedule delivery at the user's most active hour when hourly data is present
    #[arg(long = "optimal-hour", env = "ENRICHER_OPTIMAL_HOUR", default_value_t = true, action = ArgAction::Set)]
    pub optimal_hour: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { optimal_hour: true }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "ENRICHER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces, metrics and logs are exported when set
    #[arg(long, env = "ENRICHER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
