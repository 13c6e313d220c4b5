//! Email channel.

use crate::error::Result;
use async_trait::async_trait;
use digest_core::{AppConfig, DigestNotifier, NewsRecord};
use digest_mail::{render_digest, SmtpSender};

/// Sends the digest as one multipart email.
///
/// When no SMTP host is configured the notifier is still selectable but
/// delivery is skipped with a warning.
pub struct EmailNotifier {
    sender: Option<SmtpSender>,
    to: String,
    subject: String,
}

impl EmailNotifier {
    /// Build from application configuration.
    ///
    /// # Errors
    /// Returns error if the sender address is malformed or the SMTP relay
    /// cannot be configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let sender = if config.smtp.host.is_empty() {
            None
        } else {
            Some(SmtpSender::from_config(&config.smtp)?)
        };

        Ok(Self {
            sender,
            to: config.email_to.clone(),
            subject: config.email_subject.clone(),
        })
    }

    /// Recipient address.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.to
    }

    /// Whether an SMTP relay is configured.
    #[must_use]
    pub fn has_transport(&self) -> bool {
        self.sender.is_some()
    }
}

#[async_trait]
impl DigestNotifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn send_digest(&self, digest: &[NewsRecord]) -> digest_core::Result<()> {
        let Some(sender) = &self.sender else {
            tracing::warn!("SMTP host is empty, skipping digest email");
            return Ok(());
        };

        let email = render_digest(digest, &self.to, &self.subject, chrono::Utc::now());
        sender.send(&email).await.map_err(crate::NotifyError::from)?;
        Ok(())
    }
}
