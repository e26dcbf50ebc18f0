// src/config/mod.rs
//! Environment-driven configuration. Read once at startup; empty values
//! count as unset.

use std::time::Duration;

/// Used when `DISCORD_SPAM_WEBHOOK_URL` is not provided.
pub const DEFAULT_SPAM_WEBHOOK_URL: &str =
    "https://discord.com/api/webhooks/portfolio-spam/default";

pub const ENV_MAIN_WEBHOOK: &str = "DISCORD_MAIN_WEBHOOK_URL";
pub const ENV_SPAM_WEBHOOK: &str = "DISCORD_SPAM_WEBHOOK_URL";

const DEFAULT_EMAIL_FROM: &str = "contact@localhost";
const DEFAULT_EMAIL_TO: &str = "owner@localhost";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const DEFAULT_SWEEP_SECS: u64 = 60;
const DEFAULT_SESSION_MAX_EVENTS: u64 = crate::sessions::DEFAULT_MAX_EVENTS as u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Absent → every notification goes to the SPAM webhook.
    pub main_webhook: Option<String>,
    pub spam_webhook: String,
    pub resend_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
    /// Present only when host, user and password are all set.
    pub smtp: Option<SmtpConfig>,
    pub email_from: String,
    pub email_to: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub sweep_secs: u64,
    pub max_events: u64,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_secs)
    }

    pub fn max_events(&self) -> usize {
        usize::try_from(self.max_events).unwrap_or(usize::MAX)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
            sweep_secs: DEFAULT_SWEEP_SECS,
            max_events: DEFAULT_SESSION_MAX_EVENTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub notify: NotifyConfig,
    pub sessions: SessionConfig,
    pub metrics_route: bool,
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key → value source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let num = |k: &str, default: u64| {
            get(k)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let smtp = match (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASS")) {
            (Some(host), Some(user), Some(pass)) => Some(SmtpConfig { host, user, pass }),
            _ => None,
        };

        let notify = NotifyConfig {
            main_webhook: get(ENV_MAIN_WEBHOOK),
            spam_webhook: get(ENV_SPAM_WEBHOOK)
                .unwrap_or_else(|| DEFAULT_SPAM_WEBHOOK_URL.to_string()),
            resend_api_key: get("RESEND_API_KEY"),
            sendgrid_api_key: get("SENDGRID_API_KEY"),
            smtp,
            email_from: get("NOTIFY_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            email_to: get("NOTIFY_EMAIL_TO").unwrap_or_else(|| DEFAULT_EMAIL_TO.to_string()),
            timeout_secs: num("TRANSPORT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        };

        Self {
            notify,
            sessions: SessionConfig {
                ttl_secs: num("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
                sweep_secs: num("SESSION_SWEEP_SECS", DEFAULT_SWEEP_SECS),
                max_events: num("SESSION_MAX_EVENTS", DEFAULT_SESSION_MAX_EVENTS),
            },
            metrics_route: get("METRICS_ROUTE").as_deref() == Some("1"),
            json_logs: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        }
    }
}
