use super::{Envelope, Transport};
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Discord caps embed field values at 1024 characters.
pub const FIELD_VALUE_LIMIT: usize = 1024;

#[derive(Clone)]
pub struct DiscordNotifier {
    name: String,
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(name: impl Into<String>, webhook: String) -> Self {
        Self {
            name: name.into(),
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait::async_trait]
impl Transport for DiscordNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<()> {
        let payload = DiscordWebhookPayload::from_envelope(envelope);

        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Discord webhook request failed: {e}"))?;

        if let Err(e) = rsp.error_for_status_ref() {
            return Err(anyhow!("Discord webhook HTTP error: {e}"));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct DiscordEmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Serialize)]
struct DiscordFooter {
    text: String,
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    color: u32,
    fields: Vec<DiscordEmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<DiscordFooter>,
    timestamp: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_envelope(env: &Envelope) -> Self {
        let fields = env
            .fields
            .iter()
            .map(|f| DiscordEmbedField {
                name: f.name.clone(),
                value: if f.value.is_empty() {
                    "-".to_string()
                } else {
                    super::render::truncate(
                        &f.value,
                        FIELD_VALUE_LIMIT - super::render::ELLIPSIS.len(),
                    )
                },
                inline: f.inline,
            })
            .collect();

        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: env.title.clone(),
                description: env.description.clone(),
                color: env.color,
                fields,
                footer: env.footer.clone().map(|text| DiscordFooter { text }),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }],
        }
    }
}
