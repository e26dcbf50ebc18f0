use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::{Envelope, Transport};

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// SendGrid v3 mail-send API.
pub struct SendGridSender {
    api_key: String,
    endpoint: String,
    from: String,
    to: String,
    client: Client,
    timeout: Duration,
}

impl SendGridSender {
    pub fn new(api_key: String, from: &str, to: &str) -> Self {
        Self {
            api_key,
            endpoint: SENDGRID_API_URL.to_string(),
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

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    fn payload(&self, envelope: &Envelope) -> serde_json::Value {
        let mut body = json!({
            "personalizations": [{ "to": [{ "email": self.to }] }],
            "from": { "email": self.from },
            "subject": envelope.title,
            "content": [
                { "type": "text/plain", "value": envelope.to_plain_text() },
                { "type": "text/html", "value": envelope.to_html() }
            ]
        });
        if let Some(reply) = &envelope.reply_to {
            body["reply_to"] = json!({ "email": reply });
        }
        body
    }
}

#[async_trait::async_trait]
impl Transport for SendGridSender {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&self.payload(envelope))
            .send()
            .await
            .context("sendgrid post")?
            .error_for_status()
            .context("sendgrid non-2xx")?;
        Ok(())
    }
}
