use crate::error::{MailError, Result};
use crate::templates::DigestEmail;
use digest_core::SmtpConfig;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Async SMTP sender built once from configuration.
pub struct SmtpSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    /// Uses STARTTLS when `use_tls` is set, and authenticates only when a
    /// username is configured.
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let from = parse_mailbox("from", &config.from)?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port).timeout(Some(SMTP_TIMEOUT));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    pub async fn send(&self, email: &DigestEmail) -> Result<()> {
        let message = build_message(&self.from, email)?;
        self.mailer.send(message).await?;
        tracing::info!(to = %email.to, "digest email sent");
        Ok(())
    }
}

/// Builds the multipart/alternative message for a rendered digest.
pub fn build_message(from: &Mailbox, email: &DigestEmail) -> Result<Message> {
    let to = parse_mailbox("to", &email.to)?;
    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .date_now()
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))?;
    Ok(message)
}

fn parse_mailbox(field: &'static str, raw: &str) -> Result<Mailbox> {
    raw.parse().map_err(|e| MailError::InvalidAddress {
        field,
        message: format!("{raw:?}: {e}"),
    })
}
