//! Search-result pages and URL helpers.

use kunyu_core::matcher::Candidate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::consts;
use crate::text::collapse_whitespace;

/// Search rows considered by the resolver. The site ranks by its own
/// relevance, so anything past the first handful is noise.
pub const MAX_CANDIDATES: usize = 8;

/// `(title, url)` pairs from an anime search page, in site order.
pub fn anime_candidates(html: &str) -> Vec<Candidate> {
    candidates(html, &consts::ANIME_RESULT_SELECTOR)
}

/// `(name, url)` pairs from a character search page, in site order.
///
/// Labels keep the site's "Last, First" form; normalization drops the comma.
pub fn character_candidates(html: &str) -> Vec<Candidate> {
    candidates(html, &consts::CHARACTER_RESULT_SELECTOR)
}

fn candidates(html: &str, selector: &Selector) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let found: Vec<Candidate> = document
        .select(selector)
        .filter_map(candidate)
        .take(MAX_CANDIDATES)
        .collect();
    tracing::debug!(count = found.len(), "Extracted search candidates");
    found
}

fn candidate(anchor: ElementRef<'_>) -> Option<Candidate> {
    let href = anchor.value().attr("href")?;
    let label = collapse_whitespace(&anchor.text().collect::<String>());
    if label.is_empty() {
        return None;
    }
    Some(Candidate::new(label, href))
}

/// Record ID from a detail-page URL: the path segment after the kind.
///
/// `https://myanimelist.net/character/64015/Yuuta_Togashi` -> `64015`.
/// Relative links are resolved against the site root.
pub fn id_from_url(href: &str) -> Option<String> {
    let url = Url::parse(href)
        .or_else(|_| Url::parse(consts::BASE_URL).and_then(|base| base.join(href)))
        .ok()?;
    url.path_segments()?
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Whether the site served its "invalid id" page.
pub fn is_invalid_id_page(html: &str) -> bool {
    if html.trim() == consts::INVALID_ID_MARKER {
        return true;
    }
    if !html.contains(consts::INVALID_ID_MARKER) {
        return false;
    }
    Html::parse_document(html)
        .select(&consts::BAD_RESULT_SELECTOR)
        .any(|el| collapse_whitespace(&el.text().collect::<String>()) == consts::INVALID_ID_MARKER)
}
