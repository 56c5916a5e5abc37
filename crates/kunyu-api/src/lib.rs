//! Fetching, resolving and caching MyAnimeList records.
//!
//! [`MalScraper`] is the async facade; [`blocking::BlockingMalScraper`]
//! offers the same operations on plain threads.

pub mod blocking;
pub mod client;
pub mod endpoints;
pub mod error;
mod pipeline;
pub mod scraper;
pub mod source;

pub use client::{BlockingFetchClient, FetchClient, RequestLimiter};
pub use error::ScrapeError;
pub use scraper::MalScraper;
pub use source::{BlockingPageSource, PageSource};
