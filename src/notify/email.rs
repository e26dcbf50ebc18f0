use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Envelope, Transport};
use crate::config::SmtpConfig;

/// SMTP relay transport (last resort in the fallback chain).
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn from_config(smtp: &SmtpConfig, from_addr: &str, to_addr: &str) -> Result<Self> {
        let creds = Credentials::new(smtp.user.clone(), smtp.pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .with_context(|| format!("invalid SMTP_HOST {}", smtp.host))?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid NOTIFY_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }
}

#[async_trait::async_trait]
impl Transport for EmailSender {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(envelope.title.clone());

        // An unparsable submitter address just loses the Reply-To header.
        if let Some(reply) = envelope.reply_to.as_deref().and_then(|r| r.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply);
        }

        let msg = builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(envelope.to_plain_text()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(envelope.to_html()),
                    ),
            )
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
