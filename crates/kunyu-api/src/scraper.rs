use futures::future::try_join_all;
use kunyu_core::config::AppConfig;
use kunyu_core::models::{Anime, Character};
use kunyu_core::storage::Cache;
use tracing::instrument;

use crate::client::FetchClient;
use crate::error::ScrapeError;
use crate::pipeline::{Pipeline, Record};
use crate::source::PageSource;

/// Async scraping facade: by-id lookups, by-name searches, and their batch
/// forms for anime and characters.
///
/// The HTTP client and the cache connection belong to this value and are
/// released when it is dropped. Batches run every item concurrently on the
/// calling task and return results in input order; the first failure aborts
/// the whole batch.
pub struct MalScraper<S = FetchClient> {
    source: S,
    pipeline: Pipeline,
}

impl MalScraper<FetchClient> {
    /// Scraper backed by the rate-limited HTTP client described by `config`.
    pub fn open(config: &AppConfig) -> Result<Self, ScrapeError> {
        Self::with_source(FetchClient::new(&config.scraper)?, config)
    }
}

impl<S: PageSource> MalScraper<S> {
    pub fn with_source(source: S, config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            source,
            pipeline: Pipeline::new(config)?,
        })
    }

    /// Replace the configured cache (or enable one) with an already-open cache.
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.pipeline.set_cache(Some(cache));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> Option<&Cache> {
        self.pipeline.cache()
    }

    pub async fn get_anime(&self, id: &str) -> Result<Anime, ScrapeError> {
        self.get_by_id(id).await
    }

    pub async fn get_character(&self, id: &str) -> Result<Character, ScrapeError> {
        self.get_by_id(id).await
    }

    pub async fn search_anime(&self, name: &str) -> Result<Anime, ScrapeError> {
        self.search(name).await
    }

    pub async fn search_character(&self, name: &str) -> Result<Character, ScrapeError> {
        self.search(name).await
    }

    pub async fn get_anime_batch<Q: AsRef<str>>(&self, ids: &[Q]) -> Result<Vec<Anime>, ScrapeError> {
        try_join_all(ids.iter().map(|id| self.get_by_id(id.as_ref()))).await
    }

    pub async fn get_character_batch<Q: AsRef<str>>(
        &self,
        ids: &[Q],
    ) -> Result<Vec<Character>, ScrapeError> {
        try_join_all(ids.iter().map(|id| self.get_by_id(id.as_ref()))).await
    }

    pub async fn search_anime_batch<Q: AsRef<str>>(
        &self,
        names: &[Q],
    ) -> Result<Vec<Anime>, ScrapeError> {
        try_join_all(names.iter().map(|name| self.search(name.as_ref()))).await
    }

    pub async fn search_character_batch<Q: AsRef<str>>(
        &self,
        names: &[Q],
    ) -> Result<Vec<Character>, ScrapeError> {
        try_join_all(names.iter().map(|name| self.search(name.as_ref()))).await
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    async fn get_by_id<T: Record>(&self, id: &str) -> Result<T, ScrapeError> {
        if let Some(record) = self.pipeline.cached(id)? {
            return Ok(record);
        }
        let url = self.pipeline.detail_url::<T>(id);
        let html = self.source.fetch(&url, T::KIND, id).await?;
        let record = self.pipeline.parse(&html, id)?;
        self.pipeline.store(id, &record)?;
        Ok(record)
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    async fn search<T: Record>(&self, name: &str) -> Result<T, ScrapeError> {
        let url = self.pipeline.search_url::<T>(name);
        let html = self.source.fetch(&url, T::KIND, name).await?;
        let id = self.pipeline.choose::<T>(name, &html)?;
        self.get_by_id(&id).await
    }
}
