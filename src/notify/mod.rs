//! Outbound notifications.
//!
//! A contact verdict goes to the MAIN or SPAM chat webhook; if that webhook
//! fails, the ordered email transports are tried until one succeeds. Session
//! reports go to the SPAM webhook only.

pub mod discord;
pub mod email;
pub mod render;
pub mod resend;
pub mod sendgrid;

use anyhow::Result;
use metrics::counter;
use std::sync::Arc;

use crate::analyze::{Channel, Verdict};
use crate::config::NotifyConfig;
use crate::submission::Submission;

pub use discord::DiscordNotifier;
pub use email::EmailSender;
pub use resend::ResendSender;
pub use sendgrid::SendGridSender;

/// One structured message, rendered by each transport in its own format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EnvelopeField>,
    pub footer: Option<String>,
    /// Address replies should go to (the submitter), if any.
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Envelope {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EnvelopeField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn inline_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EnvelopeField {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        if let Some(d) = &self.description {
            out.push_str(d);
            out.push('\n');
        }
        out.push('\n');
        for f in &self.fields {
            out.push_str(&format!("{}:\n{}\n\n", f.name, f.value));
        }
        if let Some(footer) = &self.footer {
            out.push_str(footer);
            out.push('\n');
        }
        out
    }

    pub fn to_html(&self) -> String {
        use html_escape::encode_text;

        let mut out = format!(
            "<div style=\"border-left:4px solid #{:06x};padding-left:12px;font-family:sans-serif\">",
            self.color
        );
        out.push_str(&format!("<h2>{}</h2>", encode_text(&self.title)));
        if let Some(d) = &self.description {
            out.push_str(&format!("<p>{}</p>", encode_text(d)));
        }
        for f in &self.fields {
            out.push_str(&format!(
                "<p><strong>{}</strong><br>{}</p>",
                encode_text(&f.name),
                encode_text(&f.value).replace('\n', "<br>")
            ));
        }
        if let Some(footer) = &self.footer {
            out.push_str(&format!("<p><small>{}</small></p>", encode_text(footer)));
        }
        out.push_str("</div>");
        out
    }
}

/// A delivery mechanism (chat webhook or email provider).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// One attempt; a non-2xx status or a network error is a failure.
    async fn deliver(&self, envelope: &Envelope) -> Result<()>;
}

pub type DynTransport = Arc<dyn Transport>;

pub struct NotificationRouter {
    main: Option<DynTransport>,
    spam: DynTransport,
    fallbacks: Vec<DynTransport>,
}

impl NotificationRouter {
    pub fn new(main: Option<DynTransport>, spam: DynTransport, fallbacks: Vec<DynTransport>) -> Self {
        Self {
            main,
            spam,
            fallbacks,
        }
    }

    /// Discord webhooks plus whichever email transports have credentials,
    /// in the order Resend → SendGrid → SMTP.
    pub fn from_config(cfg: &NotifyConfig) -> Result<Self> {
        let main = cfg.main_webhook.as_ref().map(|url| {
            Arc::new(DiscordNotifier::new("discord-main", url.clone()).with_timeout(cfg.timeout_secs))
                as DynTransport
        });
        let spam = Arc::new(
            DiscordNotifier::new("discord-spam", cfg.spam_webhook.clone())
                .with_timeout(cfg.timeout_secs),
        ) as DynTransport;

        let mut fallbacks: Vec<DynTransport> = Vec::new();
        if let Some(key) = &cfg.resend_api_key {
            fallbacks.push(Arc::new(
                ResendSender::new(key.clone(), &cfg.email_from, &cfg.email_to)
                    .with_timeout(cfg.timeout_secs),
            ));
        }
        if let Some(key) = &cfg.sendgrid_api_key {
            fallbacks.push(Arc::new(
                SendGridSender::new(key.clone(), &cfg.email_from, &cfg.email_to)
                    .with_timeout(cfg.timeout_secs),
            ));
        }
        if let Some(smtp) = &cfg.smtp {
            fallbacks.push(Arc::new(EmailSender::from_config(
                smtp,
                &cfg.email_from,
                &cfg.email_to,
            )?));
        }

        tracing::info!(
            target: "notify",
            main = main.is_some(),
            fallbacks = ?fallbacks.iter().map(|t| t.name().to_string()).collect::<Vec<_>>(),
            "notification router configured"
        );
        Ok(Self::new(main, spam, fallbacks))
    }

    /// MAIN only when a MAIN webhook exists and the verdict recommends it.
    pub fn select_channel(&self, verdict: &Verdict) -> Channel {
        match (&self.main, verdict.recommendation) {
            (Some(_), Channel::Main) => Channel::Main,
            _ => Channel::Spam,
        }
    }

    pub async fn notify(&self, submission: &Submission, verdict: &Verdict) -> bool {
        let channel = self.select_channel(verdict);
        let primary = match (channel, &self.main) {
            (Channel::Main, Some(main)) => main,
            _ => &self.spam,
        };
        let envelope = render::contact_envelope(submission, verdict, channel);

        for transport in std::iter::once(primary).chain(self.fallbacks.iter()) {
            if self.attempt(transport.as_ref(), &envelope).await {
                tracing::info!(
                    target: "notify",
                    transport = transport.name(),
                    channel = %channel,
                    risk = %verdict.risk_level,
                    "contact notification delivered"
                );
                return true;
            }
        }

        tracing::error!(
            target: "notify",
            name = %submission.name,
            email = %submission.email,
            subject = %submission.subject,
            message = %submission.message,
            score = verdict.total_score,
            risk = %verdict.risk_level,
            "all transports failed; submission needs manual handling"
        );
        false
    }

    /// Session reports: SPAM webhook, no fallthrough.
    pub async fn send_report(&self, envelope: &Envelope) -> bool {
        self.attempt(self.spam.as_ref(), envelope).await
    }

    async fn attempt(&self, transport: &dyn Transport, envelope: &Envelope) -> bool {
        match transport.deliver(envelope).await {
            Ok(()) => true,
            Err(e) => {
                counter!("notify_transport_failures_total", "transport" => transport.name().to_string())
                    .increment(1);
                tracing::warn!(target: "notify", transport = transport.name(), error = %format!("{e:#}"), "transport failed");
                false
            }
        }
    }
}
