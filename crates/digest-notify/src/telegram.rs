//! Telegram Bot API channel.

use crate::error::{NotifyError, Result};
use async_trait::async_trait;
use digest_core::{DigestNotifier, NewsRecord, TelegramConfig};
use digest_mail::escape_html;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Posts one HTML-formatted message per digest item to a chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base_url: String,
    token: String,
    chat_id: i64,
}

impl TelegramNotifier {
    /// Build from the `[telegram]` config section.
    ///
    /// # Errors
    /// Returns error if the chat id is not an integer or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &TelegramConfig, timeout_secs: u64) -> Result<Self> {
        let chat_id = config
            .chat_id
            .trim()
            .parse::<i64>()
            .map_err(|_| NotifyError::InvalidChatId(config.chat_id.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NotifyError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id,
        })
    }

    /// Target chat.
    #[must_use]
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.token)
    }

    async fn send_one(&self, item: &NewsRecord) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: self.chat_id,
            text: format_message(item),
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();
        match body {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(NotifyError::Telegram {
                status: status.as_u16(),
                message: description.unwrap_or_else(|| "unknown error".to_string()),
            }),
            None => Err(NotifyError::Telegram {
                status: status.as_u16(),
                message: "unreadable response".to_string(),
            }),
        }
    }
}

/// HTML body for one item: bold title, blank line, link.
#[must_use]
pub fn format_message(item: &NewsRecord) -> String {
    let url = escape_html(&item.url);
    format!("<b>{}</b>\n\n<a href=\"{url}\">{url}</a>", escape_html(&item.title))
}

#[async_trait]
impl DigestNotifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send_digest(&self, digest: &[NewsRecord]) -> digest_core::Result<()> {
        let mut failed = Vec::new();
        let mut first_error = None;

        // keep going after a failure so one bad item does not drop the rest
        for item in digest {
            if let Err(e) = self.send_one(item).await {
                tracing::warn!(id = %item.id, "telegram message failed: {e}");
                failed.push(item.id);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            None => {
                tracing::info!(chat_id = self.chat_id, count = digest.len(), "digest sent to telegram");
                Ok(())
            }
            Some(first_error) => Err(NotifyError::TelegramPartial {
                failed,
                total: digest.len(),
                first_error: Box::new(first_error),
            }
            .into()),
        }
    }
}

// Bot API types

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    chat_id: i64,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use digest_core::NewsId;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn config() -> TelegramConfig {
        TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "-100200".to_string(),
            ..TelegramConfig::default()
        }
    }

    #[test]
    fn test_format_message() {
        let item = NewsRecord::new(NewsId::new(1).expect("id"), 0, "Intro to SQL", "http://a/1");
        assert_eq!(
            format_message(&item),
            "<b>Intro to SQL</b>\n\n<a href=\"http://a/1\">http://a/1</a>"
        );
    }

    #[test]
    fn test_format_message_escapes_title_and_url() {
        let item = NewsRecord::new(
            NewsId::new(7).expect("id"),
            0,
            "snake_case in <C> & *Rust*",
            "http://a/7?x=1&y=\"2\"",
        );
        assert_eq!(
            format_message(&item),
            "<b>snake_case in &lt;C&gt; &amp; *Rust*</b>\n\n\
             <a href=\"http://a/7?x=1&amp;y=&quot;2&quot;\">http://a/7?x=1&amp;y=&quot;2&quot;</a>"
        );
    }

    /// Minimal Bot API stand-in on loopback. Rejects messages whose text
    /// contains `reject`, accepts everything else, and records each body.
    async fn spawn_bot_api(reject: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&bodies);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let body = read_request_body(&mut socket).await;
                let (status, reply) = if body.contains(reject) {
                    (
                        "400 Bad Request",
                        r#"{"ok":false,"description":"Bad Request: can't parse entities"}"#,
                    )
                } else {
                    ("200 OK", r#"{"ok":true,"result":{}}"#)
                };
                recorded.lock().expect("lock").push(body);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                    reply.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), bodies)
    }

    async fn read_request_body(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.expect("read request");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return String::from_utf8_lossy(&buf[end + 4..end + 4 + length]).to_string();
                }
            }
        }
        String::new()
    }

    #[tokio::test]
    async fn test_failed_message_does_not_stop_delivery() {
        let (base_url, bodies) = spawn_bot_api("http://a/1").await;
        let config = TelegramConfig {
            api_base_url: base_url,
            ..config()
        };
        let notifier = TelegramNotifier::from_config(&config, 5).expect("build notifier");

        let digest: Vec<NewsRecord> = (1..=3)
            .map(|n| {
                NewsRecord::new(
                    NewsId::new(n).expect("id"),
                    0,
                    format!("Story {n}"),
                    format!("http://a/{n}"),
                )
            })
            .collect();

        let err = notifier
            .send_digest(&digest)
            .await
            .expect_err("first item is rejected");
        let message = err.to_string();
        assert!(message.contains("1 of 3 item(s) (1)"), "{message}");
        assert!(message.contains("can't parse entities"), "{message}");

        let bodies = bodies.lock().expect("lock").clone();
        assert_eq!(bodies.len(), 3);
        assert!(bodies.iter().all(|b| b.contains("\"parse_mode\":\"HTML\"")));
    }

    #[tokio::test]
    async fn test_all_messages_delivered() {
        let (base_url, bodies) = spawn_bot_api("never-matches").await;
        let config = TelegramConfig {
            api_base_url: base_url,
            ..config()
        };
        let notifier = TelegramNotifier::from_config(&config, 5).expect("build notifier");
        let digest = vec![
            NewsRecord::new(NewsId::new(1).expect("id"), 0, "a_b", "http://a/1"),
            NewsRecord::new(NewsId::new(2).expect("id"), 0, "[c", "http://a/2"),
        ];

        notifier.send_digest(&digest).await.expect("deliver digest");
        assert_eq!(bodies.lock().expect("lock").len(), 2);
    }

    #[test]
    fn test_from_config() {
        let notifier = TelegramNotifier::from_config(&config(), 10).expect("build notifier");
        assert_eq!(notifier.chat_id(), -100_200);
        assert_eq!(
            notifier.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_invalid_chat_id() {
        let mut config = config();
        config.chat_id = "general".to_string();
        assert!(matches!(
            TelegramNotifier::from_config(&config, 10),
            Err(NotifyError::InvalidChatId(_))
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = SendMessageRequest {
            chat_id: 42,
            text: "*t*".to_string(),
            parse_mode: "HTML",
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["chat_id"], 42);
        assert_eq!(json["parse_mode"], "HTML");
    }
}
