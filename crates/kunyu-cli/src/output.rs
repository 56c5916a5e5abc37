//! Plain-text rendering of records for the terminal.

use std::fmt::Write;

use kunyu_core::models::{Anime, Character, NOT_AVAILABLE};

const PREVIEW_CHARS: usize = 300;

pub fn anime(anime: &Anime) -> String {
    let mut out = String::new();
    field(&mut out, "Title", &anime.title);
    field(
        &mut out,
        "English Title",
        anime.english_title.as_deref().unwrap_or(NOT_AVAILABLE),
    );
    field(
        &mut out,
        "Japanese Title",
        anime.japanese_title.as_deref().unwrap_or(NOT_AVAILABLE),
    );
    field(&mut out, "Type", &anime.anime_type);
    field(&mut out, "Episodes", &anime.episodes);
    field(&mut out, "Duration", &anime.duration);
    field(&mut out, "Status", &anime.status);
    field(&mut out, "Rating", &anime.rating);
    field(&mut out, "Genres", &list(&anime.genres));
    field(&mut out, "Themes", &list(&anime.themes));
    field(&mut out, "Studios", &anime.studios);
    field(&mut out, "Premiered", &anime.premiered);
    field(&mut out, "Aired", &anime.aired);
    field(&mut out, "Score", &anime.stats.score);
    field(&mut out, "Scored by", &anime.stats.scored_by);
    field(&mut out, "Popularity", &anime.stats.popularity);
    field(&mut out, "Ranked", &anime.stats.ranked);
    let _ = writeln!(out, "\nSynopsis:\n{}", preview(&anime.synopsis));
    out
}

pub fn character(character: &Character) -> String {
    let mut out = String::new();
    field(&mut out, "Name", &character.name);
    field(
        &mut out,
        "Japanese Name",
        character.japanese_name.as_deref().unwrap_or(NOT_AVAILABLE),
    );
    for (label, value) in &character.about {
        field(&mut out, label.label(), value);
    }
    field(&mut out, "Favorites", &character.favorites);
    field(&mut out, "URL", &character.url);
    let _ = writeln!(out, "\nDescription:\n{}", preview(&character.description));
    out
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label}: {value}");
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(", ")
    }
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None if text.is_empty() => NOT_AVAILABLE.to_string(),
        None => text.to_string(),
    }
}
