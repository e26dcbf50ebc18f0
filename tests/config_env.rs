// tests/config_env.rs
//
// AppConfig::from_env against the real process environment. Serialised
// because the environment is process-global.

use portfolio_backend::config::{AppConfig, DEFAULT_SPAM_WEBHOOK_URL};
use serial_test::serial;

const KEYS: &[&str] = &[
    "DISCORD_SPAM_WEBHOOK_URL",
    "SESSION_TTL_SECS",
    "LOG_FORMAT",
    "METRICS_ROUTE",
];

fn clear() {
    for k in KEYS {
        std::env::remove_var(k);
    }
}

#[test]
#[serial]
fn from_env_reads_process_environment() {
    clear();
    std::env::set_var("DISCORD_SPAM_WEBHOOK_URL", "http://127.0.0.1:9/spam");
    std::env::set_var("SESSION_TTL_SECS", "600");
    std::env::set_var("LOG_FORMAT", "JSON");
    std::env::set_var("METRICS_ROUTE", "1");

    let cfg = AppConfig::from_env();
    clear();

    assert_eq!(cfg.notify.spam_webhook, "http://127.0.0.1:9/spam");
    assert_eq!(cfg.sessions.ttl_secs, 600);
    assert!(cfg.json_logs);
    assert!(cfg.metrics_route);
}

#[test]
#[serial]
fn empty_spam_webhook_uses_the_default() {
    clear();
    std::env::set_var("DISCORD_SPAM_WEBHOOK_URL", "");
    let cfg = AppConfig::from_env();
    clear();
    assert_eq!(cfg.notify.spam_webhook, DEFAULT_SPAM_WEBHOOK_URL);
}
