//! Steps shared by the async and blocking facades: URL building, cache
//! lookups, parsing, and picking a search candidate. Only fetching differs
//! between the two.

use kunyu_core::config::{AppConfig, MatchThresholds};
use kunyu_core::matcher::{self, Candidate};
use kunyu_core::models::{Anime, Character};
use kunyu_core::storage::Cache;
use kunyu_core::ResourceKind;
use kunyu_parse::ParseError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::endpoints::Endpoints;
use crate::error::ScrapeError;

/// A record type the pipeline can fetch, parse, cache and search for.
pub(crate) trait Record: Serialize + DeserializeOwned + Send {
    const KIND: ResourceKind;

    fn parse(html: &str) -> Result<Self, ParseError>;

    fn candidates(html: &str) -> Vec<Candidate>;
}

impl Record for Anime {
    const KIND: ResourceKind = ResourceKind::Anime;

    fn parse(html: &str) -> Result<Self, ParseError> {
        kunyu_parse::parse_anime(html)
    }

    fn candidates(html: &str) -> Vec<Candidate> {
        kunyu_parse::anime_candidates(html)
    }
}

impl Record for Character {
    const KIND: ResourceKind = ResourceKind::Character;

    fn parse(html: &str) -> Result<Self, ParseError> {
        kunyu_parse::parse_character(html)
    }

    fn candidates(html: &str) -> Vec<Candidate> {
        kunyu_parse::character_candidates(html)
    }
}

pub(crate) struct Pipeline {
    endpoints: Endpoints,
    thresholds: MatchThresholds,
    cache: Option<Cache>,
}

impl Pipeline {
    /// Opens the record cache when `[cache].enabled` is set.
    pub(crate) fn new(config: &AppConfig) -> Result<Self, ScrapeError> {
        config.validate()?;
        let cache = if config.cache.enabled {
            let path = config.cache.resolved_db_path();
            tracing::info!(path = %path.display(), "Opening record cache");
            Some(Cache::open(&path)?)
        } else {
            None
        };
        Ok(Self {
            endpoints: Endpoints::new(&config.scraper.base_url)?,
            thresholds: config.matching,
            cache,
        })
    }

    pub(crate) fn set_cache(&mut self, cache: Option<Cache>) {
        self.cache = cache;
    }

    pub(crate) fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }

    pub(crate) fn detail_url<T: Record>(&self, id: &str) -> Url {
        self.endpoints.detail(T::KIND, id)
    }

    pub(crate) fn search_url<T: Record>(&self, name: &str) -> Url {
        self.endpoints.search(T::KIND, name)
    }

    pub(crate) fn cached<T: Record>(&self, id: &str) -> Result<Option<T>, ScrapeError> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let record = cache.get_record(T::KIND, id)?;
        tracing::debug!(kind = %T::KIND, id, hit = record.is_some(), "Cache lookup");
        Ok(record)
    }

    /// Write-once: an id already present keeps its first record.
    pub(crate) fn store<T: Record>(&self, id: &str, record: &T) -> Result<(), ScrapeError> {
        if let Some(cache) = &self.cache {
            let written = cache.put_record(T::KIND, id, record)?;
            tracing::debug!(kind = %T::KIND, id, written, "Cache store");
        }
        Ok(())
    }

    /// Parse a detail page; the invalid-id page becomes `NotFound`.
    pub(crate) fn parse<T: Record>(&self, html: &str, id: &str) -> Result<T, ScrapeError> {
        T::parse(html).map_err(|err| match err {
            ParseError::InvalidId => ScrapeError::not_found(T::KIND, id),
            other => other.into(),
        })
    }

    /// Resolve `name` against a search page and return the chosen record id.
    pub(crate) fn choose<T: Record>(&self, name: &str, html: &str) -> Result<String, ScrapeError> {
        let candidates = T::candidates(html);
        let threshold = self.thresholds.for_kind(T::KIND);
        let resolution = matcher::resolve(name, &candidates, threshold)
            .ok_or_else(|| ScrapeError::not_found(T::KIND, name))?;
        let chosen = &candidates[resolution.index()];
        tracing::debug!(
            kind = %T::KIND,
            query = name,
            label = %chosen.label,
            score = resolution.score(),
            accepted = resolution.is_accepted(),
            "Chose search candidate"
        );
        kunyu_parse::id_from_url(&chosen.reference)
            .ok_or_else(|| ScrapeError::not_found(T::KIND, name))
    }
}
