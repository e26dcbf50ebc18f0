use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
};

use crate::analyze::{check_instant_spam, ScoringEngine};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::hashing::anon_hash;
use crate::notify::NotificationRouter;
use crate::sessions::{self, ClientHeuristics, SessionStore, COMPLETION_EVENT};
use crate::submission::Submission;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully!";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScoringEngine>,
    pub notifier: Arc<NotificationRouter>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(engine: ScoringEngine, notifier: NotificationRouter, sessions: SessionStore) -> Self {
        Self {
            engine: Arc::new(engine),
            notifier: Arc::new(notifier),
            sessions: Arc::new(sessions),
        }
    }

    /// Local scoring capabilities plus the transports the config enables.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            ScoringEngine::local(),
            NotificationRouter::from_config(&cfg.notify)?,
            SessionStore::new(cfg.sessions.ttl()).with_max_events(cfg.sessions.max_events()),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/contact", post(contact).fallback(method_not_allowed))
        .route("/api/usage", post(usage).fallback(method_not_allowed))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    ApiError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    fn accepted() -> Json<Self> {
        Json(Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}

fn outcome(label: &'static str) {
    counter!("contact_requests_total", "outcome" => label).increment(1);
}

/// honeypot → instant reject → validation → scoring → notification
async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> ApiResult<Json<ContactResponse>> {
    let Json(submission) = payload.inspect_err(|_| outcome("invalid"))?;
    let who = anon_hash(&submission.email);

    // Bots get the same answer as humans.
    if submission.is_honeypot_tripped() {
        outcome("honeypot");
        tracing::info!(target: "contact", anon = %who, "honeypot tripped; dropping silently");
        return Ok(ContactResponse::accepted());
    }

    let instant = check_instant_spam(&submission);
    if instant.is_spam {
        outcome("rejected");
        let reason = instant
            .reason
            .unwrap_or_else(|| "Submission rejected".to_string());
        tracing::info!(target: "contact", anon = %who, reason = %reason, "instant reject");
        return Err(ApiError::Rejected(reason));
    }

    if let Err(errors) = submission.validate() {
        outcome("invalid");
        return Err(ApiError::Validation(errors));
    }

    let verdict = state.engine.score(&submission).await;
    counter!("contact_verdicts_total", "risk" => verdict.risk_level.as_str()).increment(1);
    tracing::info!(
        target: "contact",
        anon = %who,
        score = verdict.total_score,
        risk = %verdict.risk_level,
        confidence = %verdict.confidence,
        flags = ?verdict.flags,
        "submission scored"
    );

    if state.notifier.notify(&submission, &verdict).await {
        outcome("delivered");
        Ok(ContactResponse::accepted())
    } else {
        outcome("undelivered");
        Err(ApiError::Delivery)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRequest {
    pub event: String,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub should_send_batch: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub success: bool,
    pub event_count: usize,
    pub session_id: String,
}

async fn usage(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UsageRequest>, JsonRejection>,
) -> ApiResult<Json<UsageResponse>> {
    let Json(req) = payload?;
    let event = req.event.trim();
    if event.is_empty() {
        return Err(ApiError::Validation(vec!["Event name is required".to_string()]));
    }

    let now = Utc::now();
    let heuristics = ClientHeuristics::from_headers(&headers);
    let key = sessions::session_key(&heuristics.ip, &heuristics.user_agent, now);
    let recorded = state
        .sessions
        .record_event(&key, heuristics, event, req.details, now);

    let mut success = true;
    if recorded > 0 && (req.should_send_batch || event == COMPLETION_EVENT) {
        success = state.sessions.flush(&key, &state.notifier).await;
    }

    Ok(Json(UsageResponse {
        success,
        event_count: state.sessions.event_count(&key).unwrap_or(0),
        session_id: sessions::short_id(&key),
    }))
}
