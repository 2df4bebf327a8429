#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, unreachable_pub)]
use reqwest::StatusCode;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod common;

use common::{LYTICS_KEY, RECOMMEND_PATH, SPARKPOST_KEY, SPARKPOST_TEMPLATE, TRANSMISSIONS_PATH, TestApp};

async fn mount_recommendations(app: &TestApp, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(RECOMMEND_PATH))
        .and(query_param("key", LYTICS_KEY))
        .respond_with(response)
        .expect(expected_calls)
        .mount(&app.lytics)
        .await;
}

async fn mount_transmissions(app: &TestApp, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TRANSMISSIONS_PATH))
        .respond_with(response)
        .expect(expected_calls)
        .mount(&app.sparkpost)
        .await;
}

#[tokio::test]
async fn test_full_enrichment_flow() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path(RECOMMEND_PATH))
        .and(query_param("key", LYTICS_KEY))
        .and(query_param("limit", "3"))
        .and(query_param("shuffle", "false"))
        .and(query_param("ql", r#"FILTER AND (url LIKE "www.example.com/blog/*") FROM content"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::lytics_recommendations()))
        .expect(1)
        .mount(&app.lytics)
        .await;

    Mock::given(method("POST"))
        .and(path(TRANSMISSIONS_PATH))
        .and(header("Authorization", SPARKPOST_KEY))
        .and(body_partial_json(json!({
            "recipients": [{
                "address": "example@test.com",
                "substitution_data": {"data": {"url": "www.example.com/blog/welcome", "title": "Welcome to the blog"}}
            }],
            "content": {"template_id": SPARKPOST_TEMPLATE}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::sparkpost_accepted()))
        .expect(1)
        .mount(&app.sparkpost)
        .await;

    let resp = app.post_event(&common::segment_entered_event()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": 200, "message": "success", "id": "11668787484950529"}));
}

#[tokio::test]
async fn test_start_time_is_next_peak_hour() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200).set_body_json(common::lytics_recommendations()), 1).await;
    mount_transmissions(&app, ResponseTemplate::new(200).set_body_json(common::sparkpost_accepted()), 1).await;

    // Peak two hours from now so the estimate never lands in the current hour.
    let peak = (OffsetDateTime::now_utc().hour() + 2) % 24;
    let mut event = common::segment_entered_event();
    event["properties"]["hourly"] = json!({ peak.to_string(): 500, "0": 1 });

    let before = OffsetDateTime::now_utc();
    let resp = app.post_event(&event).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = app.sparkpost.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = requests[0].body_json().unwrap();
    let start = OffsetDateTime::parse(sent["options"]["start_time"].as_str().unwrap(), &Rfc3339).unwrap();

    assert_eq!(start.hour(), peak);
    assert_eq!((start.minute(), start.second()), (0, 0));
    assert!(start > before);
    assert!(start - before <= time::Duration::hours(24));
}

#[tokio::test]
async fn test_no_hourly_data_sends_without_options() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200).set_body_json(common::lytics_recommendations()), 1).await;
    mount_transmissions(&app, ResponseTemplate::new(200).set_body_json(common::sparkpost_accepted()), 1).await;

    let mut event = common::segment_entered_event();
    event["properties"].as_object_mut().unwrap().remove("hourly");

    let resp = app.post_event(&event).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = app.sparkpost.received_requests().await.unwrap();
    let sent: Value = requests[0].body_json().unwrap();
    assert!(sent.get("options").is_none());
}

#[tokio::test]
async fn test_event_name_mismatch_is_skipped() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200), 0).await;
    mount_transmissions(&app, ResponseTemplate::new(200), 0).await;

    let mut event = common::segment_entered_event();
    event["event"] = json!("segment_exited");

    let resp = app.post_event(&event).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "POST");
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_segment_name_mismatch_is_skipped() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200), 0).await;
    mount_transmissions(&app, ResponseTemplate::new(200), 0).await;

    let mut event = common::segment_entered_event();
    event["properties"]["_audience_friendly"] = json!("some_other_segment");

    let resp = app.post_event(&event).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "POST");
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_email_is_bad_request() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200), 0).await;
    mount_transmissions(&app, ResponseTemplate::new(200), 0).await;

    let mut event = common::segment_entered_event();
    event["properties"].as_object_mut().unwrap().remove("email");

    let resp = app.post_event(&event).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": 400, "message": "user does not have email"}));
}

#[tokio::test]
async fn test_unrecognized_body() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200), 0).await;

    let resp = app.post_raw(r#"{"event": "segment_entered", "properties": "#).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": 500, "message": "unrecognized webhook body"}));
}

#[tokio::test]
async fn test_empty_recommendations() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200).set_body_json(json!({"status": 200, "data": []})), 1)
        .await;
    mount_transmissions(&app, ResponseTemplate::new(200), 0).await;

    let resp = app.post_event(&common::segment_entered_event()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "could not get recommendation for this user");
    assert_eq!(body["status"], 500);
}

#[tokio::test]
async fn test_recommendation_service_unauthorized() {
    let app = TestApp::spawn_with(|config| config.recommendation.api_key = "WrongKey".to_string()).await;
    Mock::given(method("GET"))
        .and(path(RECOMMEND_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status": 401, "message": "Unauthorized"})))
        .expect(1)
        .mount(&app.lytics)
        .await;
    mount_transmissions(&app, ResponseTemplate::new(200), 0).await;

    let resp = app.post_event(&common::segment_entered_event()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "could not get recommendation for this user");
}

#[tokio::test]
async fn test_messaging_provider_rejects_template() {
    let app = TestApp::spawn().await;
    mount_recommendations(&app, ResponseTemplate::new(200).set_body_json(common::lytics_recommendations()), 1).await;
    mount_transmissions(
        &app,
        ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{"message": "Subresource not found", "description": "template 'bogus' does not exist", "code": "1603"}]
        })),
        1,
    )
    .await;

    let resp = app.post_event(&common::segment_entered_event()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": 500, "message": "could not send webhook"}));
}

#[tokio::test]
async fn test_filters_disabled_accepts_any_event() {
    let app = TestApp::spawn_with(|config| {
        config.filter.event_name = None;
        config.filter.segment_name = None;
        config.schedule.optimal_hour = false;
    })
    .await;
    mount_recommendations(&app, ResponseTemplate::new(200).set_body_json(common::lytics_recommendations()), 1).await;
    mount_transmissions(&app, ResponseTemplate::new(200).set_body_json(common::sparkpost_accepted()), 1).await;

    let mut event = common::segment_entered_event();
    event["event"] = json!("segment_exited");
    event["properties"]["_audience_friendly"] = json!("anything");

    let resp = app.post_event(&event).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let requests = app.sparkpost.received_requests().await.unwrap();
    let sent: Value = requests[0].body_json().unwrap();
    assert!(sent.get("options").is_none(), "optimal hour disabled should send immediately");
}
