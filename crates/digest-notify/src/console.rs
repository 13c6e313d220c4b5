//! Console fallback channel.

use async_trait::async_trait;
use digest_core::{DigestNotifier, NewsRecord};
use std::io::Write;

/// Prints the digest to stdout, one `* title - url` line per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Render the digest lines exactly as printed.
#[must_use]
pub fn render_lines(digest: &[NewsRecord]) -> String {
    digest
        .iter()
        .map(|item| format!("* {} - {}\n", item.title, item.url))
        .collect()
}

#[async_trait]
impl DigestNotifier for ConsoleNotifier {
    fn channel(&self) -> &'static str {
        "console"
    }

    async fn send_digest(&self, digest: &[NewsRecord]) -> digest_core::Result<()> {
        if let Err(e) = write_stdout(&render_lines(digest)) {
            tracing::warn!("failed to write digest to stdout: {e}");
        }
        Ok(())
    }
}

fn write_stdout(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
