//! Filter engine.
//!
//! Configured filters are flattened into independent case-insensitive
//! sub-patterns. A record is included when its title matches any of them
//! (normal mode) or none of them (reverse mode), and its host is not
//! blacklisted.

use crate::error::{PipelineError, Result};
use digest_core::{FilterRule, NewsRecord};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use url::Url;

/// One flattened sub-pattern.
#[derive(Debug, Clone)]
struct SubPattern {
    label: String,
    source: String,
    /// `None` when the pattern failed to compile; such a pattern never matches.
    regex: Option<Regex>,
}

impl SubPattern {
    fn compile(label: &str, source: &str) -> Self {
        let regex = match RegexBuilder::new(source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(
                    filter = label,
                    pattern = source,
                    "malformed filter pattern treated as no match: {e}"
                );
                None
            }
        };
        Self {
            label: label.to_string(),
            source: source.to_string(),
            regex,
        }
    }

    fn is_match(&self, title: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(title))
    }
}

/// Compiled working filter set plus the host blacklist.
#[derive(Debug, Clone)]
pub struct FilterSet {
    patterns: Vec<SubPattern>,
    blacklist: HashSet<String>,
}

impl FilterSet {
    /// Flatten and compile the configured filters.
    ///
    /// # Errors
    /// Returns `PipelineError::NoFilters` if no sub-pattern remains.
    pub fn new(rules: &[FilterRule], blacklist: &[String]) -> Result<Self> {
        let patterns: Vec<SubPattern> = rules
            .iter()
            .flat_map(|rule| {
                rule.sub_patterns()
                    .map(move |pattern| SubPattern::compile(&rule.label, pattern))
            })
            .collect();

        if patterns.is_empty() {
            return Err(PipelineError::NoFilters);
        }

        let blacklist = blacklist
            .iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();

        Ok(Self {
            patterns,
            blacklist,
        })
    }

    /// Size of the flattened working set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always false for a constructed set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Sub-pattern sources in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// Label of the first sub-pattern matching `title`.
    #[must_use]
    pub fn first_match(&self, title: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(title))
            .map(|p| p.label.as_str())
    }

    /// Whether the URL's host is blacklisted. Unparsable URLs are not.
    #[must_use]
    pub fn is_blacklisted(&self, url: &str) -> bool {
        if self.blacklist.is_empty() {
            return false;
        }
        match Url::parse(url) {
            Ok(parsed) => parsed
                .host_str()
                .is_some_and(|host| self.blacklist.contains(&host.to_ascii_lowercase())),
            Err(_) => false,
        }
    }

    /// Decide whether a record enters the digest.
    ///
    /// Link-less records never do.
    #[must_use]
    pub fn classify(&self, record: &NewsRecord, reverse: bool) -> bool {
        if !record.has_link() {
            return false;
        }
        let matched = self.first_match(&record.title).is_some();
        matched != reverse && !self.is_blacklisted(&record.url)
    }
}
