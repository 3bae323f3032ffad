//! Shared error type for listing traversal, resolution, and the HTTP client.

use thiserror::Error;

/// Errors from pattern setup, the transport, and page-count discovery.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid extraction pattern for {field}: {source}")]
    Pattern {
        field: &'static str,
        source: regex::Error,
    },

    #[error("Unknown extraction field: '{name}'")]
    UnknownField { name: String },

    #[error("Failed to build HTTP client: {source}")]
    Client { source: reqwest::Error },

    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    #[error("No total-pages marker on listing page {url}; cannot bound the crawl. Pass --pages explicitly.")]
    PageCountMarkerMissing { url: String },
}
