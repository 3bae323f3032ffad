//! Per-item resolution: one detail-page fetch, every metadata field
//! extracted from that single payload.

use crate::model::{BookRecord, SPRINGER_BASE};
use crate::normalize::{clean_author, normalize_title};
use crate::scrape::error::ScrapeError;
use crate::scrape::patterns::{Field, Patterns};
use crate::scrape::Fetch;
use std::collections::BTreeSet;

/// Topic label substituted when a detail page does not declare a subject.
/// A missing directory name would abort the download step, so the
/// substitution is policy, not data loss.
pub const DEFAULT_TOPIC: &str = "Unclassified";

/// Resolves one item link into a complete [BookRecord].
pub struct ItemResolver<'a> {
    patterns: &'a Patterns,
    default_topic: &'a str,
}

impl<'a> ItemResolver<'a> {
    pub fn new(patterns: &'a Patterns, default_topic: &'a str) -> Self {
        Self {
            patterns,
            default_topic,
        }
    }

    /// Fetch the detail page once and extract title, topic, keywords, and
    /// authors from it. Field misses never raise: title falls back to the
    /// item link's tail, topic to the default label, keywords to an empty
    /// vector, authors to an empty set.
    pub fn resolve(
        &self,
        fetcher: &mut impl Fetch,
        item_link: &str,
    ) -> Result<BookRecord, ScrapeError> {
        let url = format!("{}{}", SPRINGER_BASE, item_link);
        let html = fetcher.fetch_text(&url)?;

        let title = self
            .patterns
            .first(&html, Field::Title)
            .map(|raw| normalize_title(&raw))
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title(item_link));

        let topic = self
            .patterns
            .first(&html, Field::Topic)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.default_topic.to_string());

        let keywords = self
            .patterns
            .first(&html, Field::KeywordList)
            .map(|inner| parse_keyword_list(&inner))
            .unwrap_or_default();

        let authors: BTreeSet<String> = self
            .patterns
            .authors(&html)
            .iter()
            .map(|a| clean_author(a))
            .filter(|a| !a.is_empty())
            .collect();

        Ok(BookRecord {
            item_link: item_link.to_string(),
            title,
            topic,
            keywords,
            authors,
        })
    }
}

/// Deterministic stand-in when a page carries no usable title: the final
/// path segment of the item link (the ISBN-like tail), which is unique
/// per item.
fn fallback_title(item_link: &str) -> String {
    item_link
        .rsplit('/')
        .find(|seg| !seg.is_empty())
        .unwrap_or("book")
        .to_string()
}

/// The keyword list is embedded in a script tag as a quoted array. Parse it
/// as JSON; fall back to splitting on commas for single-quoted or slightly
/// malformed markup. Failure yields an empty vector, never an error.
fn parse_keyword_list(inner: &str) -> Vec<String> {
    if let Ok(parsed) = serde_json::from_str::<Vec<String>>(&format!("[{}]", inner)) {
        return parsed;
    }
    inner
        .split(',')
        .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
