#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub)]

use lifecycle_enricher::config::{
    Config, FilterConfig, MessagingConfig, RecommendationConfig, ScheduleConfig, ServerConfig, TelemetryConfig,
};
use lifecycle_enricher::{AppBuilder, api, telemetry};
use serde_json::{Value, json};
use std::net::SocketAddr;
use wiremock::MockServer;

pub const LYTICS_KEY: &str = "MockLyticsKey";
pub const SPARKPOST_KEY: &str = "MockSparkpostKey";
pub const SPARKPOST_TEMPLATE: &str = "MockSparkpostTemplate";
pub const RECOMMEND_PATH: &str = "/api/content/recommend/user/emails/example@test.com";
pub const TRANSMISSIONS_PATH: &str = "/api/v1/transmissions";

pub fn get_test_config(recommendation_url: &str, messaging_url: &str) -> Config {
    Config {
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, mgmt_port: 0, shutdown_timeout_secs: 1 },
        recommendation: RecommendationConfig {
            api_key: LYTICS_KEY.to_string(),
            base_url: recommendation_url.to_string(),
            filter: r#"FILTER AND (url LIKE "www.example.com/blog/*")"#.to_string(),
            timeout_secs: 5,
            ..RecommendationConfig::default()
        },
        messaging: MessagingConfig {
            api_key: SPARKPOST_KEY.to_string(),
            url: format!("{messaging_url}{TRANSMISSIONS_PATH}"),
            template_id: SPARKPOST_TEMPLATE.to_string(),
            timeout_secs: 5,
        },
        filter: FilterConfig {
            event_name: Some("segment_entered".to_string()),
            segment_name: Some("sample_segment_name".to_string()),
        },
        schedule: ScheduleConfig { optimal_hour: true },
        telemetry: TelemetryConfig::default(),
    }
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub lytics: MockServer,
    pub sparkpost: MockServer,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Starts both upstream mocks and the server; `customize` may adjust the config first.
    pub async fn spawn_with(customize: impl FnOnce(&mut Config)) -> Self {
        telemetry::init_test_telemetry();

        let lytics = MockServer::start().await;
        let sparkpost = MockServer::start().await;
        let mut config = get_test_config(&lytics.uri(), &sparkpost.uri());
        customize(&mut config);

        let app = AppBuilder::new(config.clone()).build().unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        let router = api::app_router(app.state());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let mgmt_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_addr: SocketAddr = mgmt_listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(mgmt_listener, api::mgmt_router()).await.unwrap();
        });

        Self {
            server_url: format!("http://{addr}"),
            mgmt_url: format!("http://{mgmt_addr}"),
            client: reqwest::Client::new(),
            lytics,
            sparkpost,
            config,
        }
    }

    pub async fn post_event(&self, body: &Value) -> reqwest::Response {
        self.client.post(format!("{}/post", self.server_url)).json(body).send().await.unwrap()
    }

    pub async fn post_raw(&self, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}/post", self.server_url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }
}

/// A `segment_entered` event for `example@test.com` in the configured segment.
pub fn segment_entered_event() -> Value {
    json!({
        "version": 2,
        "type": "track",
        "userId": "user_123",
        "event": "segment_entered",
        "properties": {
            "_audience_friendly": "sample_segment_name",
            "email": "example@test.com",
            "hourly": {"18": 1140, "0": 583, "23": 1138}
        },
        "timestamp": "2016-08-05T17:28:51.012Z"
    })
}

pub fn lytics_recommendations() -> Value {
    json!({
        "status": 200,
        "message": "success",
        "data": [
            {
                "url": "www.example.com/blog/welcome",
                "title": "Welcome to the blog",
                "description": "Start here",
                "primary_image": "www.example.com/img/welcome.png",
                "topics": ["onboarding"],
                "confidence": 0.91,
                "visited": false
            },
            {
                "url": "www.example.com/blog/second",
                "title": "Second post",
                "confidence": 0.55,
                "visited": false
            }
        ]
    })
}

pub fn sparkpost_accepted() -> Value {
    json!({
        "results": {
            "total_rejected_recipients": 0,
            "total_accepted_recipients": 1,
            "id": "11668787484950529"
        }
    })
}
