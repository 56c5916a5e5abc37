//! Where page HTML comes from.
//!
//! The pipeline only needs "give me the HTML at this URL". Production uses
//! the rate-limited HTTP clients in [`crate::client`]; tests inject
//! in-memory sources.

use std::future::Future;

use kunyu_core::ResourceKind;
use url::Url;

use crate::error::ScrapeError;

/// Async page fetcher.
///
/// `kind` and `query` only shape the [`ScrapeError::NotFound`] raised on a
/// missing page.
pub trait PageSource: Send + Sync {
    fn fetch(
        &self,
        url: &Url,
        kind: ResourceKind,
        query: &str,
    ) -> impl Future<Output = Result<String, ScrapeError>> + Send;
}

/// Blocking counterpart of [`PageSource`], shared by worker threads.
pub trait BlockingPageSource: Send + Sync {
    fn fetch(&self, url: &Url, kind: ResourceKind, query: &str) -> Result<String, ScrapeError>;
}
