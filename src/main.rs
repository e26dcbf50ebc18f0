//! Portfolio backend: binary entrypoint
//! Boots the Axum HTTP server with the contact and usage endpoints, the
//! session sweeper and (optionally) the Prometheus route.

use portfolio_backend::{api, config::AppConfig, metrics::Metrics, sessions};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when `LOG_FORMAT=json`.
/// `try_init` keeps a second init (e.g. from the runtime) from panicking.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("portfolio_backend=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::from_env();
    init_tracing(cfg.json_logs);

    let state = api::AppState::from_config(&cfg)?;

    sessions::spawn_sweeper(state.sessions.clone(), cfg.sessions.sweep_interval());

    let mut router = api::router(state);
    if cfg.metrics_route {
        match Metrics::init() {
            Ok(m) => router = router.merge(m.router()),
            Err(e) => tracing::warn!(error = %format!("{e:#}"), "metrics disabled"),
        }
    }

    tracing::info!(
        main_webhook = cfg.notify.main_webhook.is_some(),
        metrics = cfg.metrics_route,
        "portfolio backend ready"
    );
    Ok(router.into())
}
