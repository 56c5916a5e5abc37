mod anime;
mod character;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use anime::{Anime, AnimeCharacter, AnimeStats, RelatedEntry, VoiceActor};
pub use character::{BioField, Character};

use crate::error::KunyuError;

/// Placeholder for scalar fields that are missing from a page.
pub const NOT_AVAILABLE: &str = "N/A";

/// The two record types served by the site.
///
/// The kind selects URL templates, cache tables, match thresholds and the
/// wording of not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Anime,
    Character,
}

impl ResourceKind {
    /// Path segment and search category used by the site.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Character => "character",
        }
    }

    /// Name of the cache table holding records of this kind.
    pub fn table(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anime => write!(f, "Anime"),
            Self::Character => write!(f, "Character"),
        }
    }
}

/// Serialize a record to the opaque text stored in the cache.
pub fn encode_record<T: Serialize>(record: &T) -> Result<String, KunyuError> {
    Ok(serde_json::to_string(record)?)
}

/// Inverse of [`encode_record`].
pub fn decode_record<T: DeserializeOwned>(data: &str) -> Result<T, KunyuError> {
    Ok(serde_json::from_str(data)?)
}

/// `"N/A"` as an owned string.
pub fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}
