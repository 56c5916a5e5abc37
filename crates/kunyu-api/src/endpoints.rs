use kunyu_core::ResourceKind;
use url::Url;

use crate::error::ScrapeError;

/// URL templates of the site: `/{kind}/{id}` and
/// `/{kind}.php?q={query}&cat={kind}`.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, ScrapeError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ScrapeError::Config(format!(
                "scraper.base_url is not a base url: {base_url}"
            )));
        }
        Ok(Self { base })
    }

    pub fn detail(&self, kind: ResourceKind, id: &str) -> Url {
        self.with_segments(&[kind.as_str(), id])
    }

    pub fn search(&self, kind: ResourceKind, query: &str) -> Url {
        let page = format!("{}.php", kind.as_str());
        let mut url = self.with_segments(&[page.as_str()]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("cat", kind.as_str());
        url
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
