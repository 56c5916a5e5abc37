//! Thread-based scraping facade.
//!
//! Same operations as [`MalScraper`](crate::MalScraper), without an async
//! runtime. Anime batches fan out over a pool of `[batch].workers` threads;
//! character batches run one item at a time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use kunyu_core::config::AppConfig;
use kunyu_core::models::{Anime, Character};
use kunyu_core::storage::Cache;
use tracing::instrument;

use crate::client::BlockingFetchClient;
use crate::error::ScrapeError;
use crate::pipeline::{Pipeline, Record};
use crate::source::BlockingPageSource;

pub struct BlockingMalScraper<S = BlockingFetchClient> {
    source: S,
    pipeline: Pipeline,
    workers: usize,
}

impl BlockingMalScraper<BlockingFetchClient> {
    /// Must not be called from inside an async runtime.
    pub fn open(config: &AppConfig) -> Result<Self, ScrapeError> {
        Self::with_source(BlockingFetchClient::new(&config.scraper)?, config)
    }
}

impl<S: BlockingPageSource> BlockingMalScraper<S> {
    pub fn with_source(source: S, config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            source,
            pipeline: Pipeline::new(config)?,
            workers: config.batch.workers,
        })
    }

    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.pipeline.set_cache(Some(cache));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn get_anime(&self, id: &str) -> Result<Anime, ScrapeError> {
        self.get_by_id(id)
    }

    pub fn get_character(&self, id: &str) -> Result<Character, ScrapeError> {
        self.get_by_id(id)
    }

    pub fn search_anime(&self, name: &str) -> Result<Anime, ScrapeError> {
        self.search(name)
    }

    pub fn search_character(&self, name: &str) -> Result<Character, ScrapeError> {
        self.search(name)
    }

    pub fn get_anime_batch<Q: AsRef<str> + Sync>(&self, ids: &[Q]) -> Result<Vec<Anime>, ScrapeError> {
        self.pooled(ids, |id| self.get_by_id(id))
    }

    pub fn search_anime_batch<Q: AsRef<str> + Sync>(
        &self,
        names: &[Q],
    ) -> Result<Vec<Anime>, ScrapeError> {
        self.pooled(names, |name| self.search(name))
    }

    pub fn get_character_batch<Q: AsRef<str>>(&self, ids: &[Q]) -> Result<Vec<Character>, ScrapeError> {
        ids.iter().map(|id| self.get_by_id(id.as_ref())).collect()
    }

    pub fn search_character_batch<Q: AsRef<str>>(
        &self,
        names: &[Q],
    ) -> Result<Vec<Character>, ScrapeError> {
        names.iter().map(|name| self.search(name.as_ref())).collect()
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    fn get_by_id<T: Record>(&self, id: &str) -> Result<T, ScrapeError> {
        if let Some(record) = self.pipeline.cached(id)? {
            return Ok(record);
        }
        let url = self.pipeline.detail_url::<T>(id);
        let html = self.source.fetch(&url, T::KIND, id)?;
        let record = self.pipeline.parse(&html, id)?;
        self.pipeline.store(id, &record)?;
        Ok(record)
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    fn search<T: Record>(&self, name: &str) -> Result<T, ScrapeError> {
        let url = self.pipeline.search_url::<T>(name);
        let html = self.source.fetch(&url, T::KIND, name)?;
        let id = self.pipeline.choose::<T>(name, &html)?;
        self.get_by_id(&id)
    }

    /// Run `op` over `inputs` on up to `self.workers` threads.
    ///
    /// Workers claim inputs in order; after a failure no new input is
    /// claimed. Output keeps input order, and the first failure in input
    /// order is returned.
    fn pooled<Q, T, F>(&self, inputs: &[Q], op: F) -> Result<Vec<T>, ScrapeError>
    where
        Q: AsRef<str> + Sync,
        T: Send,
        F: Fn(&str) -> Result<T, ScrapeError> + Sync,
    {
        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let slots: Vec<Mutex<Option<Result<T, ScrapeError>>>> =
            inputs.iter().map(|_| Mutex::new(None)).collect();
        let workers = self.workers.clamp(1, inputs.len().max(1));
        tracing::debug!(items = inputs.len(), workers, "Starting worker pool");

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    while !failed.load(Ordering::Acquire) {
                        let index = next.fetch_add(1, Ordering::AcqRel);
                        let Some(input) = inputs.get(index) else {
                            break;
                        };
                        let result = op(input.as_ref());
                        if result.is_err() {
                            failed.store(true, Ordering::Release);
                        }
                        *slots[index].lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
                    }
                });
            }
        });

        // Unclaimed slots can only follow a failed one.
        slots
            .into_iter()
            .map_while(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kunyu_core::ResourceKind;
    use url::Url;

    use super::*;

    const ANIME_DR_STONE: &str = include_str!("../../../fixtures/anime_dr_stone.html");
    const CHARACTER_TOGASHI: &str = include_str!("../../../fixtures/character_togashi.html");
    const SEARCH_TOGASHI: &str = include_str!("../../../fixtures/search_character_togashi.html");

    /// Serves fixtures by kind and records how many fetches overlap.
    /// Ids starting with "404" are missing.
    #[derive(Default)]
    struct SlowSite {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl BlockingPageSource for SlowSite {
        fn fetch(&self, url: &Url, kind: ResourceKind, query: &str) -> Result<String, ScrapeError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(40));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if query.starts_with("404") {
                return Err(ScrapeError::not_found(kind, query));
            }
            Ok(match (kind, url.path().ends_with(".php")) {
                (ResourceKind::Anime, _) => ANIME_DR_STONE.to_string(),
                (ResourceKind::Character, true) => SEARCH_TOGASHI.to_string(),
                (ResourceKind::Character, false) => CHARACTER_TOGASHI.to_string(),
            })
        }
    }

    fn scraper(workers: usize) -> BlockingMalScraper<SlowSite> {
        let mut config = AppConfig::default();
        config.batch.workers = workers;
        BlockingMalScraper::with_source(SlowSite::default(), &config).unwrap()
    }

    #[test]
    fn test_anime_batch_uses_worker_pool() {
        let scraper = scraper(3);
        let ids = ["1", "2", "3", "4", "5", "6"];
        let found = scraper.get_anime_batch(&ids).unwrap();
        assert_eq!(found.len(), ids.len());
        let overlap = scraper.source().max_in_flight.load(Ordering::SeqCst);
        assert!(overlap > 1, "anime batch ran sequentially");
        assert!(overlap <= 3, "pool exceeded its size: {overlap}");
    }

    #[test]
    fn test_character_batch_is_sequential() {
        let scraper = scraper(3);
        let found = scraper
            .get_character_batch(&["64015", "64015", "64015"])
            .unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(scraper.source().max_in_flight.load(Ordering::SeqCst), 1);

        let found = scraper
            .search_character_batch(&["Togashi, Yuuta", "Togashi"])
            .unwrap();
        assert_eq!(found[0].name, "Yuuta Togashi");
        assert_eq!(scraper.source().max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pool_preserves_order() {
        let scraper = scraper(4);
        let inputs: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let out = scraper
            .pooled(&inputs, |s| {
                // Later items finish first.
                let n: u64 = s.parse().unwrap();
                thread::sleep(Duration::from_millis(50 - n * 5));
                Ok(n)
            })
            .unwrap();
        assert_eq!(out, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn test_pool_failure_aborts_batch() {
        let scraper = scraper(2);
        let err = scraper
            .get_anime_batch(&["1", "404", "3", "4", "5", "6", "7", "8"])
            .unwrap_err();
        assert!(matches!(err, ScrapeError::NotFound { ref query, .. } if query == "404"));
        // Workers stop claiming new items once one has failed.
        assert!(scraper.source().fetches.load(Ordering::SeqCst) < 8);
    }

    #[test]
    fn test_single_worker_pool() {
        let scraper = scraper(1);
        scraper.get_anime_batch(&["1", "2", "3"]).unwrap();
        assert_eq!(scraper.source().max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_batch() {
        let scraper = scraper(5);
        assert!(scraper.get_anime_batch::<&str>(&[]).unwrap().is_empty());
        assert_eq!(scraper.source().fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cache_shared_across_workers() {
        let scraper = scraper(3).with_cache(Cache::open_memory().unwrap());
        scraper.get_anime("1").unwrap();
        scraper.get_anime_batch(&["1", "1", "1"]).unwrap();
        assert_eq!(scraper.source().fetches.load(Ordering::SeqCst), 1);
    }
}
