//! Blocking HTTP client with configurable politeness (delay between
//! requests) and retries for transient failures.

use crate::scrape::error::ScrapeError;
use crate::scrape::Fetch;
use std::time::{Duration, Instant};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; openshelf/0.1; +https://github.com/openshelf)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DELAY_SECS: u64 = 2;
const MAX_REDIRECTS: usize = 10;

/// Default number of attempts for a fetch (initial plus retries).
const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default backoff delays in seconds after each failed attempt.
const DEFAULT_BACKOFF_SECS: [u64; 2] = [1, 2];
/// Backoff for HTTP 429 (rate limit): wait longer so the server can recover.
const BACKOFF_429_SECS: [u64; 4] = [30, 60, 90, 120];

/// Blocking HTTP client that enforces a delay between requests.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
    delay: Duration,
    last_request: Option<Instant>,
    retry_count: u32,
    backoff_secs: Vec<u64>,
}

impl PoliteClient {
    /// Build a polite client with default User-Agent, timeout, and delay.
    pub fn new() -> Result<Self, ScrapeError> {
        Self::builder().build()
    }

    /// Builder for custom User-Agent, delay, timeout, and retry settings.
    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }

    /// GET with retries for transient failures.
    ///
    /// Retries on: timeout, connection errors, HTTP 5xx, and HTTP 429.
    /// Non-retryable failures (e.g. 4xx except 429) are returned
    /// immediately. Updates the last-request time for politeness.
    fn get_with_retry(&mut self, url: &str) -> Result<reqwest::blocking::Response, ScrapeError> {
        let max_attempts = self.retry_count;
        let mut last_err: Option<ScrapeError> = None;
        for attempt in 0..max_attempts {
            self.wait_delay();
            match self.inner.get(url).send() {
                Ok(response) => {
                    let status = response.status();
                    let retryable_status = status.is_server_error() || status.as_u16() == 429;
                    if retryable_status && attempt < max_attempts - 1 {
                        last_err = Some(ScrapeError::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                        let backoff = if status.as_u16() == 429 {
                            BACKOFF_429_SECS
                                .get(attempt as usize)
                                .copied()
                                .unwrap_or(*BACKOFF_429_SECS.last().unwrap_or(&60))
                        } else {
                            self.backoff_for(attempt)
                        };
                        std::thread::sleep(Duration::from_secs(backoff));
                        continue;
                    }
                    self.last_request = Some(Instant::now());
                    return Ok(response);
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if retryable && attempt < max_attempts - 1 {
                        last_err = Some(ScrapeError::Network {
                            url: url.to_string(),
                            source: e,
                        });
                        let backoff = self.backoff_for(attempt);
                        std::thread::sleep(Duration::from_secs(backoff));
                        continue;
                    }
                    self.last_request = Some(Instant::now());
                    return Err(ScrapeError::Network {
                        url: url.to_string(),
                        source: e,
                    });
                }
            }
        }
        Err(last_err.unwrap_or(ScrapeError::HttpStatus {
            status: 0,
            url: url.to_string(),
        }))
    }

    fn backoff_for(&self, attempt: u32) -> u64 {
        self.backoff_secs
            .get(attempt as usize)
            .copied()
            .unwrap_or_else(|| *self.backoff_secs.last().unwrap_or(&1))
    }

    fn wait_delay(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
    }

    fn checked(
        &mut self,
        url: &str,
    ) -> Result<reqwest::blocking::Response, ScrapeError> {
        let response = self.get_with_retry(url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl Fetch for PoliteClient {
    fn fetch_text(&mut self, url: &str) -> Result<String, ScrapeError> {
        self.checked(url)?
            .text()
            .map_err(|source| ScrapeError::BodyRead {
                url: url.to_string(),
                source,
            })
    }

    fn fetch_bytes(&mut self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.checked(url)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|source| ScrapeError::BodyRead {
                url: url.to_string(),
                source,
            })
    }
}

/// Builder for PoliteClient with optional User-Agent, delay, timeout, and
/// retry settings.
#[derive(Debug)]
pub struct PoliteClientBuilder {
    user_agent: Option<String>,
    delay_secs: u64,
    timeout_secs: u64,
    retry_count: u32,
    retry_backoff_secs: Vec<u64>,
}

impl Default for PoliteClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            delay_secs: DEFAULT_DELAY_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_backoff_secs: DEFAULT_BACKOFF_SECS.to_vec(),
        }
    }
}

impl PoliteClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set delay between requests in seconds. Default 2.
    pub fn delay_secs(mut self, secs: u64) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set number of HTTP attempts for transient failures (default 3).
    pub fn retry_count(mut self, n: u32) -> Self {
        self.retry_count = n.max(1);
        self
    }

    /// Set backoff delays in seconds before each retry (e.g. [1, 2, 4]).
    /// Length should be retry_count - 1; if shorter, the last value is reused.
    pub fn retry_backoff_secs(mut self, secs: Vec<u64>) -> Self {
        self.retry_backoff_secs = secs;
        self
    }

    /// Build the blocking client and polite wrapper.
    pub fn build(self) -> Result<PoliteClient, ScrapeError> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|source| ScrapeError::Client { source })?;
        let backoff_secs = if self.retry_backoff_secs.is_empty() {
            // Exponential 1, 2, 4, ... for (retry_count - 1) steps
            let n = self.retry_count.saturating_sub(1) as usize;
            (0..n).map(|i| 1u64 << i.min(4)).collect::<Vec<_>>()
        } else {
            self.retry_backoff_secs
        };
        Ok(PoliteClient {
            inner,
            delay: Duration::from_secs(self.delay_secs),
            last_request: None,
            retry_count: self.retry_count,
            backoff_secs,
        })
    }
}
