//! HTTP client for directory pages using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

const RETRY_MIN_DELAY: Duration = Duration::from_millis(250);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// Trait for fetching directory pages - enables mocking for tests.
#[async_trait]
pub trait DirectoryFetch: Send + Sync {
    /// Fetches `path` (relative to the site root, or absolute) with the given
    /// query pairs and returns the HTML body.
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String, FetchError>;
}

/// Directory HTTP client with browser impersonation, politeness delay, and retries.
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
    max_retries: usize,
}

impl DirectoryClient {
    /// Creates a client for the configured site.
    pub async fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None).await
    }

    /// Creates a client with an optional custom base URL (for testing).
    pub async fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| config.base_url.clone()),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            max_retries: config.max_retries,
        })
    }

    /// Returns the site root requests are joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` to the base URL and appends the encoded query pairs.
    pub fn build_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            let base = self.base_url.trim_end_matches('/');
            match path.strip_prefix('/') {
                Some(rest) => format!("{}/{}", base, rest),
                None => format!("{}/{}", base, path),
            }
        };

        for (key, value) in query {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    /// Performs a single GET request with browser headers.
    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status.as_u16() == 429 {
            warn!("Rate limited (429). Consider using a proxy or increasing delay.");
        }

        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        response.text().await.map_err(|source| FetchError::Body { url: url.to_string(), source })
    }

    /// Adds a random delay to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(RETRY_MIN_DELAY)
            .with_max_delay(RETRY_MAX_DELAY)
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

#[async_trait]
impl DirectoryFetch for DirectoryClient {
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let url = self.build_url(path, query);

        (|| self.get_once(&url))
            .retry(self.backoff())
            .sleep(tokio::time::sleep)
            .when(FetchError::is_transient)
            .notify(|err: &FetchError, after: Duration| {
                warn!("{}; retrying in {:?}", err, after);
            })
            .await
    }
}
