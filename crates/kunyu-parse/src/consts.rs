use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect("static selector is valid"));
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($regex).expect("static regex is valid"));
    };
}

pub(crate) const BASE_URL: &str = "https://myanimelist.net/";
pub(crate) const INVALID_ID_MARKER: &str = "Invalid ID provided.";
/// Opening and closing boundaries of the biography block on a character page.
pub(crate) const CHARACTER_START: &str = r#"<h2 class="normal_header" style="height: 15px;">"#;
pub(crate) const CHARACTER_END: &str = r#"<div class="normal_header">"#;

// Anime detail page
selector!(ANIME_ID_SELECTOR, r#"input[name="aid"]"#);
selector!(TITLE_SELECTOR, "h1.title-name");
selector!(DARK_TEXT_SELECTOR, "span.dark_text");
selector!(SYNOPSIS_SELECTOR, r#"p[itemprop="description"]"#);
selector!(SCORE_SELECTOR, r#"span[itemprop="ratingValue"]"#);
selector!(SCORED_BY_SELECTOR, r#"span[itemprop="ratingCount"]"#);
selector!(RANKED_SELECTOR, "span.numbers.ranked strong");
selector!(ANCHOR_SELECTOR, "a[href]");
selector!(SMALL_SELECTOR, "small");

// Cast roster
selector!(CAST_TABLE_SELECTOR, r#"div.detail-characters-list table[width="100%"]"#);
selector!(CAST_HEADING_SELECTOR, "h3.h3_characters_voice_actors");
selector!(VOICE_ACTOR_SELECTOR, "td.va-t.ar.pl4.pr4");

// Related entries, tile and table layouts
selector!(RELATED_TILE_SELECTOR, "div.related-entries div.entry");
selector!(RELATED_TILE_RELATION_SELECTOR, ".relation");
selector!(RELATED_TILE_TITLE_SELECTOR, ".title a[href]");
selector!(RELATED_ROW_SELECTOR, "table.entries-table tr");
selector!(CELL_SELECTOR, "td");
selector!(RELATED_ROW_LINK_SELECTOR, "ul.entries li a[href]");

// Search results
selector!(ANIME_RESULT_SELECTOR, "a.hoverinfo_trigger.fw-b.fl-l");
selector!(CHARACTER_RESULT_SELECTOR, r#"td[width="175"] > a[href]"#);
selector!(BAD_RESULT_SELECTOR, "div.badresult");

// Character page
selector!(OG_URL_SELECTOR, r#"meta[property="og:url"]"#);
selector!(OG_IMAGE_SELECTOR, r#"meta[property="og:image"]"#);
selector!(PORTRAIT_SELECTOR, "img.portrait-225x350");
regex!(FAVORITES_REGEX, r"Member Favorites:\s*([\d,]+)");
// "[1]", "(Source: ...)" or a bare "Source:" attribution.
regex!(CITATION_REGEX, r"(?i)\[|\(\s*source\b|\bsource\s*:");
