// tests/usage_http.rs
//
// POST /api/usage: event accumulation per derived session, explicit and
// implicit flushes, and the session surviving a flush.

mod common;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _;

use common::{app, Recording, BODY_LIMIT};

fn post_usage(payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/usage")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "198.51.100.23")
        .header("user-agent", "usage-test/1.0")
        .header("accept-language", "en-US")
        .body(Body::from(payload.to_string()))
        .expect("build POST /api/usage")
}

async fn send(app: &Router, payload: Json) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(post_usage(payload)).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn events_accumulate_and_flush_clears_them() {
    let spam = Recording::ok("spam");
    let app = app(None, &spam, &[]);

    let mut session_id = String::new();
    for (i, name) in ["page_view", "scroll", "field_focus"].iter().enumerate() {
        let (status, body) = send(&app, json!({ "event": name, "details": { "page": "/" } })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["eventCount"], i + 1);
        session_id = body["sessionId"].as_str().unwrap().to_string();
    }
    assert_eq!(session_id.len(), 8);

    let (_, body) = send(&app, json!({ "event": "scroll", "shouldSendBatch": true })).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["eventCount"], 0);
    assert_eq!(spam.calls(), 1);
    assert!(spam.titles()[0].contains("4 events"));

    // Same session, nothing pending.
    let (_, body) = send(&app, json!({ "event": "heartbeat" })).await;
    assert_eq!(body["eventCount"], 0);
    assert_eq!(body["sessionId"], session_id.as_str());
}

#[tokio::test]
async fn completion_event_flushes_implicitly() {
    let spam = Recording::ok("spam");
    let app = app(None, &spam, &[]);

    send(&app, json!({ "event": "page_view" })).await;
    let (_, body) = send(&app, json!({ "event": "form_submitted" })).await;
    assert_eq!(body["eventCount"], 0);
    assert_eq!(spam.calls(), 1);
}

#[tokio::test]
async fn failed_flush_keeps_events() {
    let spam = Recording::failing("spam");
    let app = app(None, &spam, &[]);

    send(&app, json!({ "event": "page_view" })).await;
    let (status, body) = send(&app, json!({ "event": "click", "shouldSendBatch": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["eventCount"], 2);
}

#[tokio::test]
async fn housekeeping_only_batch_sends_nothing() {
    let spam = Recording::ok("spam");
    let app = app(None, &spam, &[]);

    let (_, body) = send(&app, json!({ "event": "ping", "shouldSendBatch": true })).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["eventCount"], 0);
    assert_eq!(spam.calls(), 0);
}

#[tokio::test]
async fn missing_event_name_is_rejected() {
    let spam = Recording::ok("spam");
    let app = app(None, &spam, &[]);
    let (status, body) = send(&app, json!({ "event": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Event name is required");
}
