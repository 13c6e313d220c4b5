//! Priority-ordered channel selection.

use crate::console::ConsoleNotifier;
use crate::email::EmailNotifier;
use crate::error::Result;
use crate::telegram::TelegramNotifier;
use digest_core::{AppConfig, DigestNotifier};
use std::sync::Arc;

/// Ordered list of candidate channels; exactly the first one is used.
///
/// Built once per run. [`Dispatcher::from_config`] always ends the list with
/// the console channel, so a configured dispatcher is never empty.
#[derive(Clone, Default)]
pub struct Dispatcher {
    candidates: Vec<Arc<dyn DigestNotifier>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `[telegram?, email?, console]` from configuration.
    ///
    /// Telegram is a candidate when both token and chat id are set, email
    /// when a recipient is set.
    ///
    /// # Errors
    /// Returns error if a configured channel cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut dispatcher = Self::new();

        if config.telegram.is_configured() {
            dispatcher.add(Arc::new(TelegramNotifier::from_config(
                &config.telegram,
                config.request_timeout_secs,
            )?));
        }
        if !config.email_to.is_empty() {
            dispatcher.add(Arc::new(EmailNotifier::from_config(config)?));
        }
        dispatcher.add(Arc::new(ConsoleNotifier::new()));

        tracing::debug!(channels = ?dispatcher.channels(), "notification channels resolved");
        Ok(dispatcher)
    }

    /// Append a lower-priority candidate.
    pub fn add(&mut self, notifier: Arc<dyn DigestNotifier>) {
        self.candidates.push(notifier);
    }

    /// Builder form of [`Dispatcher::add`].
    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn DigestNotifier>) -> Self {
        self.add(notifier);
        self
    }

    /// The channel that will receive the digest.
    #[must_use]
    pub fn select(&self) -> Option<&Arc<dyn DigestNotifier>> {
        self.candidates.first()
    }

    /// Candidate channel names in priority order.
    #[must_use]
    pub fn channels(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|n| n.channel()).collect()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("channels", &self.channels())
            .finish()
    }
}
