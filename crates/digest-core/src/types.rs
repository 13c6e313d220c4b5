//! Shared types used across hn-digest.
//!
//! This module defines the item identifiers, the wire shape returned by the
//! remote source, the normalized record that gets persisted, and the small
//! enums that parameterize a run.

use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored in place of the title and URL of link-less items.
pub const NO_LINK_PLACEHOLDER: &str = "-";

/// Identifier of a news item in the remote source.
///
/// Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct NewsId(i64);

impl NewsId {
    /// Create a new `NewsId`.
    ///
    /// # Errors
    /// Returns error if the value is zero or negative.
    pub fn new(id: i64) -> Result<Self, DigestError> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(DigestError::Source(format!(
                "invalid item id: must be positive, got {id}"
            )))
        }
    }

    /// Get the raw integer value.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for NewsId {
    type Error = DigestError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NewsId> for i64 {
    fn from(id: NewsId) -> Self {
        id.0
    }
}

impl fmt::Display for NewsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item detail exactly as the remote source returns it.
///
/// `title` and `url` are absent for comments, jobs without links and
/// deleted items; that is valid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Item identifier
    pub id: NewsId,
    /// Creation time, Unix seconds
    #[serde(default)]
    pub time: Option<i64>,
    /// Headline
    #[serde(default)]
    pub title: Option<String>,
    /// Linked article
    #[serde(default)]
    pub url: Option<String>,
}

/// A fetched item normalized for classification and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Item identifier
    pub id: NewsId,
    /// Creation time, Unix seconds
    pub created_at: i64,
    /// Headline, or the placeholder for link-less items
    pub title: String,
    /// Linked article, or the placeholder for link-less items
    pub url: String,
}

impl NewsRecord {
    /// Create a record with a link.
    pub fn new(id: NewsId, created_at: i64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            created_at,
            title: title.into(),
            url: url.into(),
        }
    }

    /// Normalize a source item.
    ///
    /// Items without a URL get the placeholder for both title and URL.
    /// `fetched_at` stands in for a missing creation time.
    #[must_use]
    pub fn from_source_item(item: SourceItem, fetched_at: i64) -> Self {
        let created_at = item.time.unwrap_or(fetched_at);
        match item.url.filter(|url| !url.is_empty()) {
            Some(url) => Self {
                id: item.id,
                created_at,
                title: item.title.unwrap_or_default(),
                url,
            },
            None => Self {
                id: item.id,
                created_at,
                title: NO_LINK_PLACEHOLDER.to_string(),
                url: NO_LINK_PLACEHOLDER.to_string(),
            },
        }
    }

    /// Whether the record carries a usable link.
    ///
    /// Link-less records are persisted but never enter a digest.
    #[must_use]
    pub fn has_link(&self) -> bool {
        !self.url.is_empty() && self.url != NO_LINK_PLACEHOLDER
    }
}

/// Storage partition of the seen set.
///
/// Normal and reverse runs keep separate seen sets so that one policy's
/// inserts never hide an item from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Items that matched at least one filter are reported
    Normal,
    /// Items that matched no filter are reported
    Reverse,
}

impl Namespace {
    /// Select the namespace for a run.
    #[must_use]
    pub fn for_run(reverse: bool) -> Self {
        if reverse {
            Self::Reverse
        } else {
            Self::Normal
        }
    }

    /// Whether this is the reverse-filter partition.
    #[must_use]
    pub fn is_reverse(self) -> bool {
        matches!(self, Self::Reverse)
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured filter: a label plus one or more comma-separated patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Human-readable name
    #[serde(rename = "title")]
    pub label: String,
    /// Comma-separated case-insensitive regular expressions
    #[serde(rename = "value")]
    pub pattern: String,
}

impl FilterRule {
    /// Create a new filter rule.
    pub fn new(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
        }
    }

    /// Split the pattern into its non-empty sub-patterns.
    pub fn sub_patterns(&self) -> impl Iterator<Item = &str> {
        self.pattern.split(',').filter(|p| !p.is_empty())
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Size of the flattened working filter set
    pub filter_count: usize,
    /// Number of items in the digest
    pub matched_count: usize,
}
