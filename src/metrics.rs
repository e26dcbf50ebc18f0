use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once, from the binary.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("contact_requests_total", "Contact submissions by outcome");
        describe_counter!("contact_verdicts_total", "Scored submissions by risk level");
        describe_counter!(
            "contact_fallback_verdicts_total",
            "Verdicts produced by the keyword fallback"
        );
        describe_counter!(
            "notify_transport_failures_total",
            "Failed delivery attempts per transport"
        );
        describe_counter!("usage_events_total", "Stored usage events");
        describe_counter!("usage_events_dropped_total", "Usage events dropped at the per-session cap");
        describe_counter!("usage_batches_total", "Session batch flushes by delivery result");
        describe_gauge!("usage_sessions_active", "Sessions currently held in memory");
        gauge!("usage_sessions_active").set(0.0);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
