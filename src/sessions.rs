//! # Session Event Aggregator
//! In-memory table of usage sessions keyed by a derived identifier.
//!
//! Events accumulate per session, up to a cap, until a flush sends them to
//! the SPAM webhook in as many reports as the embed limits need; delivered
//! events are cleared but the session is kept. Expiry is an explicit `sweep(now)` so the caller owns the clock;
//! `spawn_sweeper` drives it from a tokio interval in the binary.
//!
//! State is process-local: several instances never share sessions.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::analyze::{keyword_score, KeywordScore};
use crate::hashing::sha256_hex;
use crate::notify::{render, NotificationRouter};

/// Recording this event flushes the session.
pub const COMPLETION_EVENT: &str = "form_submitted";

/// Keep-alive events: they refresh activity but are not stored.
pub const HOUSEKEEPING_EVENTS: &[&str] = &["heartbeat", "ping", "session_ping"];

/// Detail keys whose string values are scanned for spam.
pub const FREE_TEXT_KEYS: &[&str] = &["message", "text", "input", "value", "content", "subject"];

/// Width of the time bucket mixed into the session key.
pub const KEY_BUCKET_SECS: i64 = 30 * 60;

pub const SHORT_ID_LEN: usize = 8;

/// Stored events per session; later events are dropped until a flush.
pub const DEFAULT_MAX_EVENTS: usize = 500;

/// Request fingerprint captured when a session is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHeuristics {
    pub ip: String,
    pub user_agent: String,
    pub referer: Option<String>,
    pub language: Option<String>,
    pub encoding: Option<String>,
    pub fetch_site: Option<String>,
    pub fetch_mode: Option<String>,
    pub fetch_dest: Option<String>,
}

impl ClientHeuristics {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let ip = get("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .or_else(|| get("x-real-ip"))
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            ip,
            user_agent: get("user-agent").unwrap_or_else(|| "unknown".to_string()),
            referer: get("referer"),
            language: get("accept-language"),
            encoding: get("accept-encoding"),
            fetch_site: get("sec-fetch-site"),
            fetch_mode: get("sec-fetch-mode"),
            fetch_dest: get("sec-fetch-dest"),
        }
    }
}

/// `sha256(ip | user-agent | time bucket)`, hex encoded.
pub fn session_key(ip: &str, user_agent: &str, now: DateTime<Utc>) -> String {
    let bucket = now.timestamp().div_euclid(KEY_BUCKET_SECS);
    sha256_hex(&format!("{ip}|{user_agent}|{bucket}"))
}

pub fn short_id(key: &str) -> String {
    key.chars().take(SHORT_ID_LEN).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub name: String,
    pub details: Map<String, Value>,
    pub analysis: Option<KeywordScore>,
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(name: &str, details: Map<String, Value>, now: DateTime<Utc>) -> Self {
        let analysis = analyze_details(&details);
        Self {
            name: name.to_string(),
            details,
            analysis,
            timestamp: now,
        }
    }
}

fn analyze_details(details: &Map<String, Value>) -> Option<KeywordScore> {
    let text = FREE_TEXT_KEYS
        .iter()
        .filter_map(|k| details.get(*k).and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(keyword_score(&text))
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub heuristics: ClientHeuristics,
    pub events: Vec<SessionEvent>,
    pub first_activity: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Snapshot handed to the renderer on flush.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub key: String,
    pub heuristics: ClientHeuristics,
    pub events: Vec<SessionEvent>,
    pub first_activity: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionReport {
    pub fn short_id(&self) -> String {
        short_id(&self.key)
    }
}

#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
    ttl: chrono::Duration,
    max_events: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::minutes(30)),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max.max(1);
        self
    }

    /// Append an event, creating the session from `heuristics` if needed.
    /// An existing session keeps its original snapshot. A full session drops
    /// the event but still counts as active. Returns the number of stored
    /// events.
    pub fn record_event(
        &self,
        key: &str,
        heuristics: ClientHeuristics,
        name: &str,
        details: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> usize {
        let mut map = self.inner.lock().expect("session table mutex poisoned");
        let created = !map.contains_key(key);
        let session = map.entry(key.to_string()).or_insert_with(|| Session {
            heuristics,
            events: Vec::new(),
            first_activity: now,
            last_activity: now,
        });
        session.last_activity = now;

        if HOUSEKEEPING_EVENTS.contains(&name) {
            // activity only
        } else if session.events.len() >= self.max_events {
            counter!("usage_events_dropped_total").increment(1);
            tracing::debug!(target: "usage", session = %short_id(key), event = name, "session full; event dropped");
        } else {
            session.events.push(SessionEvent::new(name, details, now));
            counter!("usage_events_total").increment(1);
        }
        let count = session.events.len();

        if created {
            gauge!("usage_sessions_active").set(map.len() as f64);
            tracing::debug!(target: "usage", session = %short_id(key), "session created");
        }
        count
    }

    pub fn event_count(&self, key: &str) -> Option<usize> {
        let map = self.inner.lock().expect("session table mutex poisoned");
        map.get(key).map(|s| s.events.len())
    }

    pub fn contains(&self, key: &str) -> bool {
        let map = self.inner.lock().expect("session table mutex poisoned");
        map.contains_key(key)
    }

    pub fn snapshot(&self, key: &str) -> Option<SessionReport> {
        let map = self.inner.lock().expect("session table mutex poisoned");
        map.get(key).map(|s| SessionReport {
            key: key.to_string(),
            heuristics: s.heuristics.clone(),
            events: s.events.clone(),
            first_activity: s.first_activity,
            last_activity: s.last_activity,
        })
    }

    /// Send the pending events as one or more reports, each listing as many
    /// whole events as fit. Every delivered batch is drained at once, so a
    /// failure part-way leaves exactly the unreported events queued.
    /// Returns true only when every pending event was delivered; false when
    /// there was nothing to send.
    pub async fn flush(&self, key: &str, router: &NotificationRouter) -> bool {
        let Some(report) = self.snapshot(key) else {
            return false;
        };
        let total = report.events.len();
        if total == 0 {
            return false;
        }

        let mut sent = 0;
        while sent < total {
            let batch = render::session_batch(&report, sent);
            let delivered = router.send_report(&batch.envelope).await;
            counter!("usage_batches_total", "delivered" => delivered.to_string()).increment(1);
            if !delivered {
                tracing::warn!(
                    target: "usage",
                    session = %report.short_id(),
                    sent,
                    queued = total - sent,
                    "session batch not delivered"
                );
                return false;
            }

            // Events recorded while the report was in flight stay queued.
            let mut map = self.inner.lock().expect("session table mutex poisoned");
            if let Some(session) = map.get_mut(key) {
                let n = batch.reported.min(session.events.len());
                session.events.drain(..n);
            }
            sent += batch.reported;
        }

        tracing::info!(target: "usage", session = %report.short_id(), events = total, "session batches delivered");
        true
    }

    /// Drop sessions idle for longer than the TTL. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut map = self.inner.lock().expect("session table mutex poisoned");
        let before = map.len();
        map.retain(|_, s| now.signed_duration_since(s.last_activity) <= self.ttl);
        let removed = before - map.len();
        gauge!("usage_sessions_active").set(map.len() as f64);
        if removed > 0 {
            tracing::debug!(target: "usage", removed, remaining = map.len(), "expired sessions swept");
        }
        removed
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }
}

/// Periodic sweep driven by a tokio interval. Wire this from app startup.
pub fn spawn_sweeper(store: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            store.sweep(Utc::now());
        }
    })
}
