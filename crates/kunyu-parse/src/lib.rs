//! HTML extractors for MyAnimeList pages.
//!
//! Every function here is pure: it takes the page text and returns typed
//! records from `kunyu-core`. Fetching, caching and candidate resolution
//! live in `kunyu-api`.

mod consts;
mod error;
mod text;

pub mod anime;
pub mod character;
pub mod search;

pub use anime::parse_anime;
pub use character::parse_character;
pub use error::ParseError;
pub use search::{anime_candidates, character_candidates, id_from_url, is_invalid_id_page};
