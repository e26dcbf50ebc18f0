// tests/common/mod.rs
//
// Shared helpers: an in-memory Transport that records every envelope and can
// be told to fail (always, or after a number of deliveries), plus a Router
// builder wired to such transports.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use portfolio_backend::{
    api, notify::DynTransport, AppState, Envelope, NotificationRouter, ScoringEngine,
    SessionStore, Transport,
};

pub const BODY_LIMIT: usize = 1024 * 1024;

pub struct Recording {
    name: String,
    /// Deliveries that succeed before every later one fails.
    succeed_for: usize,
    calls: AtomicUsize,
    envelopes: Mutex<Vec<Envelope>>,
}

impl Recording {
    fn build(name: &str, succeed_for: usize) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            succeed_for,
            calls: AtomicUsize::new(0),
            envelopes: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(name: &str) -> Arc<Self> {
        Self::build(name, usize::MAX)
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Self::build(name, 0)
    }

    pub fn fail_after(name: &str, successes: usize) -> Arc<Self> {
        Self::build(name, successes)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn titles(&self) -> Vec<String> {
        self.envelopes
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.title.clone())
            .collect()
    }

    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().unwrap().clone()
    }
}

/// Event names listed in a session report's "Events" fields, in order.
pub fn listed_event_names(envelope: &Envelope) -> Vec<String> {
    envelope
        .fields
        .iter()
        .filter(|f| f.name.starts_with("Events"))
        .flat_map(|f| f.value.lines())
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

#[async_trait::async_trait]
impl Transport for Recording {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<()> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.envelopes.lock().unwrap().push(envelope.clone());
        if n >= self.succeed_for {
            Err(anyhow!("{} is down", self.name))
        } else {
            Ok(())
        }
    }
}

pub fn dyn_t(t: &Arc<Recording>) -> DynTransport {
    t.clone() as DynTransport
}

/// Router with the local engine and the given transports.
pub fn app(
    main: Option<&Arc<Recording>>,
    spam: &Arc<Recording>,
    fallbacks: &[&Arc<Recording>],
) -> axum::Router {
    let router = NotificationRouter::new(
        main.map(dyn_t),
        dyn_t(spam),
        fallbacks.iter().map(|t| dyn_t(t)).collect(),
    );
    api::router(AppState::new(
        ScoringEngine::local(),
        router,
        SessionStore::default(),
    ))
}
