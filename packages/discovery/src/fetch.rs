//! Source fetching seam and the default HTTP implementation.
//!
//! The worker is fetcher-agnostic: it hands a URL and fixed headers to a
//! [`Fetcher`] and gets back raw text or a [`FetchError`]. Timeouts are
//! enforced here, not in the worker loop.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Performs one network fetch for a connector.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch `url` with the given headers, returning the response body.
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> FetchResult<String>;
}

/// Default fetcher backed by `reqwest`.
///
/// Issues plain GET requests with no authentication and no body. Non-2xx
/// statuses are fetch errors.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: "DiscoveryBot/1.0".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client (custom timeouts, proxies, TLS).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(String, String)]) -> FetchResult<String> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!(url = %url, "fetch starting");

        let mut request = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}
