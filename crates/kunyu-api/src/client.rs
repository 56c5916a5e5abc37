use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use kunyu_core::config::ScraperConfig;
use kunyu_core::ResourceKind;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use url::Url;

use crate::error::ScrapeError;
use crate::source::{BlockingPageSource, PageSource};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token bucket shared by every request of one client.
///
/// `max_requests` permits per `per_seconds`, refilled one at a time, with the
/// full allowance available as an initial burst.
#[derive(Clone)]
pub struct RequestLimiter {
    inner: Arc<DirectLimiter>,
}

impl std::fmt::Debug for RequestLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLimiter").finish_non_exhaustive()
    }
}

impl RequestLimiter {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let burst = NonZeroU32::new(config.max_requests)
            .ok_or_else(|| ScrapeError::Config("scraper.max_requests must be > 0".into()))?;
        let quota = Quota::with_period(config.period() / config.max_requests)
            .ok_or_else(|| ScrapeError::Config("scraper.per_seconds must be > 0".into()))?
            .allow_burst(burst);
        Ok(Self {
            inner: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Wait for a permit.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }

    /// Wait for a permit, parking the current thread.
    pub fn acquire_blocking(&self) {
        futures::executor::block_on(self.inner.until_ready());
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ScrapeError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ScrapeError::Config(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScrapeError::Config(format!("invalid value for header {name}: {e}")))?;
        map.insert(header, value);
    }
    Ok(map)
}

/// Non-success statuses other than 404 still hand the body to the
/// extractors, which then fail on missing markup.
fn check_status(
    status: StatusCode,
    url: &Url,
    kind: ResourceKind,
    query: &str,
) -> Result<(), ScrapeError> {
    tracing::debug!(%url, status = status.as_u16(), "Fetched page");
    if status == StatusCode::NOT_FOUND {
        return Err(ScrapeError::not_found(kind, query));
    }
    if !status.is_success() {
        tracing::warn!(%url, status = status.as_u16(), "Unexpected status from site");
    }
    Ok(())
}

/// Rate-limited async HTTP client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    limiter: RequestLimiter,
}

impl FetchClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .default_headers(header_map(&config.headers)?)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            limiter: RequestLimiter::new(config)?,
        })
    }
}

impl PageSource for FetchClient {
    async fn fetch(&self, url: &Url, kind: ResourceKind, query: &str) -> Result<String, ScrapeError> {
        self.limiter.acquire().await;
        let resp = self.http.get(url.clone()).send().await?;
        check_status(resp.status(), url, kind, query)?;
        Ok(resp.text().await?)
    }
}

/// Rate-limited blocking HTTP client for the thread-pool facade.
#[derive(Debug, Clone)]
pub struct BlockingFetchClient {
    http: reqwest::blocking::Client,
    limiter: RequestLimiter,
}

impl BlockingFetchClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let http = reqwest::blocking::Client::builder()
            .default_headers(header_map(&config.headers)?)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            limiter: RequestLimiter::new(config)?,
        })
    }
}

impl BlockingPageSource for BlockingFetchClient {
    fn fetch(&self, url: &Url, kind: ResourceKind, query: &str) -> Result<String, ScrapeError> {
        self.limiter.acquire_blocking();
        let resp = self.http.get(url.clone()).send()?;
        check_status(resp.status(), url, kind, query)?;
        Ok(resp.text()?)
    }
}
