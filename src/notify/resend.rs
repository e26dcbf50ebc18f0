use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Envelope, Transport};

pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend HTTP email API.
pub struct ResendSender {
    api_key: String,
    endpoint: String,
    from: String,
    to: String,
    client: Client,
    timeout: Duration,
}

impl ResendSender {
    pub fn new(api_key: String, from: &str, to: &str) -> Self {
        Self {
            api_key,
            endpoint: RESEND_API_URL.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Send to another URL, e.g. a regional or local endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: String,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[async_trait::async_trait]
impl Transport for ResendSender {
    fn name(&self) -> &str {
        "resend"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<()> {
        let body = ResendEmail {
            from: &self.from,
            to: [&self.to],
            subject: &envelope.title,
            text: envelope.to_plain_text(),
            html: envelope.to_html(),
            reply_to: envelope.reply_to.as_deref(),
        };

        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("resend post")?
            .error_for_status()
            .context("resend non-2xx")?;
        Ok(())
    }
}
