//! Listing traversal and per-item resolution: the fetch seam, shared polite
//! client, extraction patterns, scanner, and resolver.

mod client;
mod error;

pub mod listing;
pub mod patterns;
pub mod resolver;

pub use client::{PoliteClient, PoliteClientBuilder};
pub use error::ScrapeError;

/// Blocking fetch seam between the pipeline and the HTTP transport.
///
/// Implemented by [PoliteClient] for real runs and by an in-memory fetcher
/// in tests; the scanner, resolver, and downloader only see this trait.
pub trait Fetch {
    /// Fetch a page and return its body as text. Non-2xx is an error.
    fn fetch_text(&mut self, url: &str) -> Result<String, ScrapeError>;

    /// Fetch a binary resource and return its bytes. Non-2xx is an error.
    fn fetch_bytes(&mut self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::{Fetch, ScrapeError};
    use std::collections::{HashMap, HashSet};

    /// In-memory fetcher for offline tests. Registered URLs answer with
    /// their body; URLs marked failing answer HTTP 503; everything else 404.
    #[derive(Debug, Default)]
    pub struct MockFetch {
        pages: HashMap<String, String>,
        files: HashMap<String, Vec<u8>>,
        failing: HashSet<String>,
        pub requests: Vec<String>,
    }

    impl MockFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.pages.insert(url.into(), body.into());
            self
        }

        pub fn file(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
            self.files.insert(url.into(), bytes.into());
            self
        }

        pub fn failing(mut self, url: impl Into<String>) -> Self {
            self.failing.insert(url.into());
            self
        }

        pub fn request_count(&self, url: &str) -> usize {
            self.requests.iter().filter(|r| *r == url).count()
        }

        fn check(&mut self, url: &str) -> Result<(), ScrapeError> {
            self.requests.push(url.to_string());
            if self.failing.contains(url) {
                return Err(ScrapeError::HttpStatus {
                    status: 503,
                    url: url.to_string(),
                });
            }
            Ok(())
        }
    }

    impl Fetch for MockFetch {
        fn fetch_text(&mut self, url: &str) -> Result<String, ScrapeError> {
            self.check(url)?;
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }

        fn fetch_bytes(&mut self, url: &str) -> Result<Vec<u8>, ScrapeError> {
            self.check(url)?;
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }
}
