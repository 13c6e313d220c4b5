//! HTTP client for the Hacker News Firebase API.

use crate::error::{Result, SourceError};
use async_trait::async_trait;
use digest_core::{NewsId, NewsSource, SourceItem};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public Hacker News API root.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// [`NewsSource`] backed by the Hacker News API.
#[derive(Debug, Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl HackerNewsClient {
    /// Create a client for the public API with the default timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client for a custom API root.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Internal(format!("failed to create HTTP client: {e}")))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the ranked top stories list.
    #[must_use]
    pub fn top_stories_url(&self) -> String {
        format!("{}/topstories.json", self.base_url)
    }

    /// URL of a single item.
    #[must_use]
    pub fn item_url(&self, id: NewsId) -> String {
        format!("{}/item/{id}.json", self.base_url)
    }

    async fn get_body(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::ApiError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl NewsSource for HackerNewsClient {
    async fn top_story_ids(&self) -> digest_core::Result<Vec<NewsId>> {
        let url = self.top_stories_url();
        let body = self.get_body(&url).await?;
        let ids = decode_story_ids(&url, &body)?;
        tracing::debug!(count = ids.len(), "top stories fetched");
        Ok(ids)
    }

    async fn fetch_item(&self, id: NewsId) -> digest_core::Result<SourceItem> {
        let url = self.item_url(id);
        let body = self.get_body(&url).await?;
        Ok(decode_item(&url, id, &body)?)
    }
}

/// Decode the top stories body.
pub fn decode_story_ids(url: &str, body: &str) -> Result<Vec<NewsId>> {
    parse_json(url, body)
}

/// Decode an item body. The API answers `null` for unknown ids.
pub fn decode_item(url: &str, id: NewsId, body: &str) -> Result<SourceItem> {
    let item: Option<SourceItem> = parse_json(url, body)?;
    item.ok_or(SourceError::NotFound(id))
}

fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| SourceError::ParseError {
        url: url.to_string(),
        message: e.to_string(),
    })
}
