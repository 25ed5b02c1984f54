//! HTTP transport for provider requests.
//!
//! Providers talk to the network through the [`Fetch`] trait so that the
//! transport can be swapped out, e.g. for a canned response in tests.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{GeocodeError, Result};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw HTTP reply: status code and body, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs a GET request and hands back the raw reply.
///
/// Any HTTP status, including 4xx and 5xx, is a successful fetch. Only a
/// failure to obtain a response at all (DNS, connect, timeout, unreadable
/// body) is reported as [`GeocodeError::Transport`].
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<RawResponse>;
}

/// [`Fetch`] implementation backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("geocode/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeocodeError::Transport {
                url: String::new(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<RawResponse> {
        let transport = |e: reqwest::Error| GeocodeError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport)?;

        Ok(RawResponse { status, body })
    }
}
