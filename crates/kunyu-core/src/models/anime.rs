use serde::{Deserialize, Serialize};

use super::not_available;

/// Score and popularity counters as displayed on the anime page.
///
/// Values are kept verbatim ("8.75", "1,234,567", "#28") so grouping and
/// rank prefixes survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeStats {
    pub score: String,
    pub scored_by: String,
    pub ranked: String,
    pub popularity: String,
    pub members: String,
    pub favorites: String,
}

impl Default for AnimeStats {
    fn default() -> Self {
        Self {
            score: not_available(),
            scored_by: not_available(),
            ranked: not_available(),
            popularity: not_available(),
            members: not_available(),
            favorites: not_available(),
        }
    }
}

/// Voice actor credited for a cast member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceActor {
    pub id: String,
    pub name: String,
    pub role: String,
    pub url: String,
}

impl VoiceActor {
    /// Stand-in used when the page lists no voice actor for a character.
    pub fn unknown() -> Self {
        Self {
            id: not_available(),
            name: not_available(),
            role: not_available(),
            url: not_available(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

/// One entry of the character roster on an anime page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeCharacter {
    pub id: String,
    /// Display name with commas removed ("Spiegel, Spike" -> "Spiegel Spike").
    pub name: String,
    pub role: String,
    pub voice_actor: VoiceActor,
}

/// A link to another work in the same franchise (sequel, adaptation, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntry {
    pub relation: String,
    pub title: String,
    pub url: String,
}

/// An anime scraped from its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    /// Site ID, kept as the string found on the page.
    pub id: String,
    pub title: String,
    pub english_title: Option<String>,
    pub japanese_title: Option<String>,
    pub anime_type: String,
    pub episodes: String,
    pub status: String,
    pub aired: String,
    pub duration: String,
    pub premiered: String,
    pub rating: String,
    pub synopsis: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub studios: String,
    #[serde(default)]
    pub producers: Vec<String>,
    #[serde(default)]
    pub licensors: Vec<String>,
    pub stats: AnimeStats,
    #[serde(default)]
    pub characters: Vec<AnimeCharacter>,
    #[serde(default)]
    pub related: Vec<RelatedEntry>,
}
