// tests/session_batches.rs
//
// Long sessions: a flush splits the events over several reports, and every
// event ends up either listed in a delivered report or still queued.

mod common;

use chrono::{TimeZone, Utc};
use portfolio_backend::{NotificationRouter, SessionStore};
use serde_json::{json, Map};

use common::{dyn_t, listed_event_names, Recording};

const KEY: &str = "f00dfeedf00dfeedf00dfeedf00dfeedf00dfeedf00dfeedf00dfeedf00dfeed";

fn record(store: &SessionStore, count: usize) -> Vec<String> {
    let at = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let name = format!("click_{i}");
            let details = json!({ "target": format!("#project-card-{i}"), "x": i * 3, "y": 480 });
            store.record_event(
                KEY,
                Default::default(),
                &name,
                details.as_object().cloned().unwrap_or_else(Map::new),
                at,
            );
            name
        })
        .collect()
}

#[tokio::test]
async fn long_session_is_reported_across_several_batches() {
    let store = SessionStore::default();
    let spam = Recording::ok("spam");
    let router = NotificationRouter::new(None, dyn_t(&spam), vec![]);
    let recorded = record(&store, 300);

    assert!(store.flush(KEY, &router).await);
    assert_eq!(store.event_count(KEY), Some(0));

    let envelopes = spam.envelopes();
    assert!(envelopes.len() > 1, "300 events should not fit one report");
    let reported: Vec<String> = envelopes.iter().flat_map(listed_event_names).collect();
    assert_eq!(reported, recorded);
    assert!(envelopes[0].title.contains("events 1-"));
    assert!(envelopes.last().unwrap().title.ends_with("of 300"));
}

#[tokio::test]
async fn failed_batch_leaves_unreported_events_queued() {
    let store = SessionStore::default();
    let spam = Recording::fail_after("spam", 1);
    let router = NotificationRouter::new(None, dyn_t(&spam), vec![]);
    let recorded = record(&store, 300);

    assert!(!store.flush(KEY, &router).await);
    assert_eq!(spam.calls(), 2);

    let delivered = listed_event_names(&spam.envelopes()[0]);
    assert!(!delivered.is_empty());
    let queued: Vec<String> = store
        .snapshot(KEY)
        .expect("session survives a failed flush")
        .events
        .into_iter()
        .map(|e| e.name)
        .collect();

    assert_eq!(delivered.len() + queued.len(), recorded.len());
    let mut seen = delivered;
    seen.extend(queued);
    assert_eq!(seen, recorded);
}

#[tokio::test]
async fn retry_after_failure_sends_only_what_was_left() {
    let store = SessionStore::default();
    let flaky = Recording::fail_after("spam", 1);
    let recorded = record(&store, 150);
    assert!(!store.flush(KEY, &NotificationRouter::new(None, dyn_t(&flaky), vec![])).await);
    let first = listed_event_names(&flaky.envelopes()[0]);

    let spam = Recording::ok("spam");
    assert!(store.flush(KEY, &NotificationRouter::new(None, dyn_t(&spam), vec![])).await);
    let rest: Vec<String> = spam.envelopes().iter().flat_map(listed_event_names).collect();

    assert_eq!([first, rest].concat(), recorded);
    assert_eq!(store.event_count(KEY), Some(0));
}
