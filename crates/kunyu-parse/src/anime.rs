use kunyu_core::models::{
    not_available, Anime, AnimeCharacter, AnimeStats, RelatedEntry, VoiceActor,
};
use scraper::{ElementRef, Html};
use tracing::instrument;

use crate::consts;
use crate::error::ParseError;
use crate::search::{id_from_url, is_invalid_id_page};
use crate::text::{collapse_whitespace, element_text, remove_commas};

/// Parse an anime detail page.
///
/// Fails when the page is the site's invalid-id page, or when the id input
/// or the title heading is missing. Every other field degrades to `"N/A"`
/// (scalars) or an empty list.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn parse_anime(html: &str) -> Result<Anime, ParseError> {
    if is_invalid_id_page(html) {
        return Err(ParseError::InvalidId);
    }
    let page = AnimePage::new(html);
    let anime = Anime {
        id: page.id()?,
        title: page.title()?,
        english_title: page.labeled(&["English"]),
        japanese_title: page.labeled(&["Japanese"]),
        anime_type: page.labeled_or_na(&["Type"]),
        episodes: page.labeled_or_na(&["Episodes"]),
        status: page.labeled_or_na(&["Status"]),
        aired: page.labeled_or_na(&["Aired"]),
        duration: page.labeled_or_na(&["Duration"]),
        premiered: page.labeled_or_na(&["Premiered"]),
        rating: page.labeled_or_na(&["Rating"]),
        synopsis: page.synopsis(),
        genres: page.labeled_links(&["Genres", "Genre"]),
        themes: page.labeled_links(&["Themes", "Theme"]),
        studios: page.labeled_or_na(&["Studios", "Studio"]),
        producers: page.labeled_links(&["Producers", "Producer"]),
        licensors: page.labeled_links(&["Licensors", "Licensor"]),
        stats: page.stats(),
        characters: page.characters(),
        related: page.related(),
    };
    tracing::debug!(
        id = %anime.id,
        characters = anime.characters.len(),
        related = anime.related.len(),
        "Parsed anime page"
    );
    Ok(anime)
}

struct AnimePage {
    document: Html,
}

impl AnimePage {
    fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn id(&self) -> Result<String, ParseError> {
        self.document
            .select(&consts::ANIME_ID_SELECTOR)
            .find_map(|input| input.value().attr("value"))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or(ParseError::MissingElement("anime id"))
    }

    fn title(&self) -> Result<String, ParseError> {
        self.document
            .select(&consts::TITLE_SELECTOR)
            .next()
            .map(element_text)
            .filter(|title| !title.is_empty())
            .ok_or(ParseError::MissingElement("title"))
    }

    /// The info row whose `span.dark_text` reads `"{label}:"`, trying each
    /// label variant in turn.
    fn labeled_row(&self, labels: &[&str]) -> Option<(ElementRef<'_>, String)> {
        labels.iter().find_map(|label| {
            let marker = format!("{label}:");
            self.document
                .select(&consts::DARK_TEXT_SELECTOR)
                .find(|span| element_text(*span) == marker)
                .and_then(|span| span.parent().and_then(ElementRef::wrap))
                .map(|row| (row, marker))
        })
    }

    /// Row text after the label, e.g. `"Status: Finished Airing"` -> `"Finished Airing"`.
    fn labeled(&self, labels: &[&str]) -> Option<String> {
        let (row, marker) = self.labeled_row(labels)?;
        let text = row.text().collect::<String>();
        let value = text.rsplit(marker.as_str()).next().unwrap_or_default();
        Some(collapse_whitespace(value)).filter(|v| !v.is_empty())
    }

    fn labeled_or_na(&self, labels: &[&str]) -> String {
        self.labeled(labels).unwrap_or_else(not_available)
    }

    /// Anchor texts of an info row. "add some" edit links are skipped.
    fn labeled_links(&self, labels: &[&str]) -> Vec<String> {
        let Some((row, _)) = self.labeled_row(labels) else {
            return Vec::new();
        };
        row.select(&consts::ANCHOR_SELECTOR)
            .filter(|a| {
                !a.value()
                    .attr("href")
                    .is_some_and(|href| href.contains("dbchanges.php"))
            })
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn synopsis(&self) -> String {
        self.document
            .select(&consts::SYNOPSIS_SELECTOR)
            .next()
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(not_available)
    }

    fn first_text(&self, selector: &scraper::Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(element_text)
            .filter(|s| !s.is_empty())
    }

    fn stats(&self) -> AnimeStats {
        AnimeStats {
            score: self
                .first_text(&consts::SCORE_SELECTOR)
                .unwrap_or_else(not_available),
            scored_by: self
                .first_text(&consts::SCORED_BY_SELECTOR)
                .unwrap_or_else(not_available),
            ranked: self
                .first_text(&consts::RANKED_SELECTOR)
                .unwrap_or_else(not_available),
            popularity: self.labeled_or_na(&["Popularity"]),
            members: self.labeled_or_na(&["Members"]),
            favorites: self.labeled_or_na(&["Favorites"]),
        }
    }

    fn characters(&self) -> Vec<AnimeCharacter> {
        self.document
            .select(&consts::CAST_TABLE_SELECTOR)
            .filter_map(cast_member)
            .collect()
    }

    fn related(&self) -> Vec<RelatedEntry> {
        let tiles = self
            .document
            .select(&consts::RELATED_TILE_SELECTOR)
            .filter_map(|tile| {
                let relation = tile
                    .select(&consts::RELATED_TILE_RELATION_SELECTOR)
                    .next()
                    .map(element_text)?;
                let link = tile.select(&consts::RELATED_TILE_TITLE_SELECTOR).next()?;
                Some(related_entry(&relation, link))
            });

        let rows = self
            .document
            .select(&consts::RELATED_ROW_SELECTOR)
            .flat_map(|row| {
                let relation = row
                    .select(&consts::CELL_SELECTOR)
                    .next()
                    .map(element_text)
                    .unwrap_or_default();
                row.select(&consts::RELATED_ROW_LINK_SELECTOR)
                    .map(move |link| related_entry(&relation, link))
                    .collect::<Vec<_>>()
            });

        tiles.chain(rows).collect()
    }
}

fn related_entry(relation: &str, link: ElementRef<'_>) -> RelatedEntry {
    RelatedEntry {
        relation: relation.trim_end_matches(':').trim().to_string(),
        title: element_text(link),
        url: link.value().attr("href").unwrap_or_default().to_string(),
    }
}

/// One roster table: character link in the heading, role in the `small`
/// beside it, and an optional voice-actor cell.
fn cast_member(table: ElementRef<'_>) -> Option<AnimeCharacter> {
    let heading = table.select(&consts::CAST_HEADING_SELECTOR).next()?;
    let link = heading.select(&consts::ANCHOR_SELECTOR).next()?;
    let href = link.value().attr("href")?;
    let role = heading
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|cell| cell.select(&consts::SMALL_SELECTOR).next())
        .map(element_text)
        .unwrap_or_else(not_available);

    Some(AnimeCharacter {
        id: id_from_url(href).unwrap_or_else(not_available),
        name: remove_commas(&element_text(link)),
        role,
        voice_actor: voice_actor(table),
    })
}

fn voice_actor(table: ElementRef<'_>) -> VoiceActor {
    let Some(cell) = table.select(&consts::VOICE_ACTOR_SELECTOR).next() else {
        return VoiceActor::unknown();
    };
    let Some((link, href)) = cell
        .select(&consts::ANCHOR_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href").map(|href| (a, href)))
    else {
        return VoiceActor::unknown();
    };
    VoiceActor {
        id: id_from_url(href).unwrap_or_else(not_available),
        name: remove_commas(&element_text(link)),
        role: cell
            .select(&consts::SMALL_SELECTOR)
            .next()
            .map(element_text)
            .unwrap_or_else(not_available),
        url: href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use kunyu_core::models::NOT_AVAILABLE;

    #[test]
    fn test_dr_stone_scalars() {
        let anime = parse_anime(fixtures::ANIME_DR_STONE).unwrap();
        assert_eq!(anime.id, "38691");
        assert_eq!(anime.title, "Dr. Stone");
        assert_eq!(anime.english_title.as_deref(), Some("Dr. Stone"));
        assert_eq!(anime.japanese_title.as_deref(), Some("ドクターストーン"));
        assert_eq!(anime.anime_type, "TV");
        assert_eq!(anime.episodes, "24");
        assert_eq!(anime.status, "Finished Airing");
        assert_eq!(anime.aired, "Jul 5, 2019 to Dec 13, 2019");
        assert_eq!(anime.premiered, "Summer 2019");
        assert_eq!(anime.duration, "24 min. per ep.");
        assert_eq!(anime.rating, "PG-13 - Teens 13 or older");
        assert_eq!(anime.studios, "TMS Entertainment");
        assert!(anime.synopsis.starts_with("After five years"));
        assert!(anime.synopsis.ends_with("around the world."));
    }

    #[test]
    fn test_dr_stone_lists_and_singular_theme() {
        let anime = parse_anime(fixtures::ANIME_DR_STONE).unwrap();
        assert_eq!(anime.genres, ["Adventure", "Comedy", "Sci-Fi"]);
        assert_eq!(anime.themes, ["Historical"]);
        assert_eq!(anime.producers, ["TV Tokyo", "Kadokawa Shoten", "Shueisha"]);
        assert_eq!(anime.licensors, ["VIZ Media"]);
    }

    #[test]
    fn test_dr_stone_stats() {
        let stats = parse_anime(fixtures::ANIME_DR_STONE).unwrap().stats;
        assert_eq!(stats.score, "8.25");
        assert_eq!(stats.scored_by, "1,020,233");
        assert_eq!(stats.ranked, "#220");
        assert_eq!(stats.popularity, "#130");
        assert_eq!(stats.members, "1,637,431");
        assert_eq!(stats.favorites, "17,563");
    }

    #[test]
    fn test_cast_roster() {
        let cast = parse_anime(fixtures::ANIME_DR_STONE).unwrap().characters;
        assert_eq!(cast.len(), 2);

        let senkuu = &cast[0];
        assert_eq!(senkuu.id, "146157");
        assert_eq!(senkuu.name, "Ishigami Senkuu");
        assert_eq!(senkuu.role, "Main");
        assert_eq!(senkuu.voice_actor.id, "40773");
        assert_eq!(senkuu.voice_actor.name, "Kobayashi Yuusuke");
        assert_eq!(senkuu.voice_actor.role, "Japanese");
        assert_eq!(
            senkuu.voice_actor.url,
            "https://myanimelist.net/people/40773/Yuusuke_Kobayashi"
        );

        let chrome = &cast[1];
        assert_eq!(chrome.name, "Chrome");
        assert_eq!(chrome.role, "Supporting");
        assert!(chrome.voice_actor.is_unknown());
    }

    #[test]
    fn test_related_entries() {
        let related = parse_anime(fixtures::ANIME_DR_STONE).unwrap().related;
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].relation, "Sequel (TV)");
        assert_eq!(related[0].title, "Dr. Stone: Stone Wars");
        assert_eq!(related[1].relation, "Adaptation");
        assert_eq!(related[1].url, "https://myanimelist.net/manga/105943/Dr_Stone");
    }

    #[test]
    fn test_sparse_page_uses_placeholders() {
        let anime = parse_anime(fixtures::ANIME_COWBOY_BEBOP).unwrap();
        assert_eq!(anime.id, "1");
        assert_eq!(anime.title, "Cowboy Bebop");
        assert_eq!(anime.english_title, None);
        assert_eq!(anime.japanese_title.as_deref(), Some("カウボーイビバップ"));
        // Singular/plural label variants.
        assert_eq!(anime.genres, ["Action"]);
        assert_eq!(anime.themes, ["Adult Cast", "Space"]);
        assert_eq!(anime.studios, "Sunrise");
        // "add some" edit link is not a producer.
        assert!(anime.producers.is_empty());
        assert!(anime.licensors.is_empty());
        assert!(anime.characters.is_empty());
        assert!(anime.related.is_empty());
        assert_eq!(anime.synopsis, NOT_AVAILABLE);
        assert_eq!(anime.aired, NOT_AVAILABLE);
        assert_eq!(anime.stats.score, NOT_AVAILABLE);
        assert_eq!(anime.stats.ranked, NOT_AVAILABLE);
        assert_eq!(anime.stats.members, "4,012,345");
    }

    #[test]
    fn test_missing_structure_is_an_error() {
        let err = parse_anime("<html><body><h1 class=\"title-name\">X</h1></body></html>")
            .unwrap_err();
        assert_eq!(err, ParseError::MissingElement("anime id"));

        let err = parse_anime(r#"<input name="aid" value="5">"#).unwrap_err();
        assert_eq!(err, ParseError::MissingElement("title"));
    }

    #[test]
    fn test_invalid_id_page() {
        assert_eq!(
            parse_anime(fixtures::CHARACTER_INVALID).unwrap_err(),
            ParseError::InvalidId
        );
    }
}
