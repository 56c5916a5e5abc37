//! Character profile pages.
//!
//! The biography is loose text between two header markers, so it is read as
//! lines: one per text node, spoiler blocks removed. A line counts as a
//! biography field when it is short, contains a colon, carries no citation,
//! and its label is one of the [`BioField`] labels. Everything after the last
//! such line is the description.

use std::collections::BTreeMap;

use kunyu_core::models::{not_available, BioField, Character};
use scraper::node::Node;
use scraper::Html;
use tracing::instrument;

use crate::consts;
use crate::error::ParseError;
use crate::search::{id_from_url, is_invalid_id_page};

/// Lines this long or longer are prose, even if they contain a colon.
const MAX_BIO_LINE_CHARS: usize = 40;

const SPOILER_CLASSES: &[&str] = &["spoiler", "spoiler_content"];
const LINE_BREAKING: &[&str] = &["br", "p", "div", "li", "tr"];

/// Parse a character profile page.
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn parse_character(html: &str) -> Result<Character, ParseError> {
    if is_invalid_id_page(html) {
        return Err(ParseError::InvalidId);
    }

    let document = Html::parse_document(html);
    let url = meta_content(&document, &consts::OG_URL_SELECTOR)
        .ok_or(ParseError::MissingElement("character url"))?;
    let id = id_from_url(&url).ok_or(ParseError::MissingElement("character id"))?;
    let img = meta_content(&document, &consts::OG_IMAGE_SELECTOR)
        .or_else(|| portrait(&document))
        .unwrap_or_else(not_available);
    let favorites = consts::FAVORITES_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(not_available);

    let nodes = biography_nodes(biography_block(html)?);
    let lines = lines(&nodes);
    let (name, _) = lines
        .first()
        .ok_or(ParseError::MissingElement("character name"))?;
    let japanese_name = lines
        .get(1)
        .and_then(|(line, _)| line.strip_prefix('('))
        .and_then(|line| line.strip_suffix(')'))
        .map(str::to_string);
    let header_end = if japanese_name.is_some() { 1 } else { 0 };

    let mut about = BTreeMap::new();
    let mut last_bio_node = lines[header_end].1;
    for (line, node) in &lines[header_end + 1..] {
        if let Some((field, value)) = bio_line(line) {
            about.insert(field, value);
            last_bio_node = *node;
        }
    }
    let description = description(&nodes[last_bio_node + 1..]);

    let character = Character {
        id,
        name: name.to_string(),
        japanese_name,
        about,
        description,
        img,
        favorites,
        url,
    };
    tracing::debug!(id = %character.id, fields = character.about.len(), "Parsed character page");
    Ok(character)
}

/// The markup between the biography header and the next section header.
fn biography_block(html: &str) -> Result<&str, ParseError> {
    let (_, rest) = html
        .split_once(consts::CHARACTER_START)
        .ok_or(ParseError::MissingElement("character header"))?;
    Ok(rest
        .split_once(consts::CHARACTER_END)
        .map_or(rest, |(block, _)| block))
}

/// Raw text nodes of the block in document order, spoilers excluded.
/// Line-breaking elements contribute a `"\n"` node of their own.
fn biography_nodes(block: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(block);
    fragment
        .root_element()
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor.value().as_element().is_some_and(|el| {
                    el.classes().any(|class| SPOILER_CLASSES.contains(&class))
                })
            })
        })
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(text.to_string()),
            Node::Element(el) if LINE_BREAKING.contains(&el.name()) => Some("\n".to_string()),
            _ => None,
        })
        .collect()
}

/// Non-empty trimmed lines, each tagged with the index of its text node.
fn lines(nodes: &[String]) -> Vec<(&str, usize)> {
    nodes
        .iter()
        .enumerate()
        .flat_map(|(index, node)| node.lines().map(move |line| (line.trim(), index)))
        .filter(|(line, _)| !line.is_empty())
        .collect()
}

fn bio_line(line: &str) -> Option<(BioField, String)> {
    if line.chars().count() >= MAX_BIO_LINE_CHARS || has_citation(line) {
        return None;
    }
    let (label, value) = line.split_once(':')?;
    let field = label.trim().parse::<BioField>().ok()?;
    Some((field, value.trim().to_string()))
}

fn has_citation(line: &str) -> bool {
    consts::CITATION_REGEX.is_match(line)
}

fn description(nodes: &[String]) -> String {
    nodes
        .concat()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn meta_content(document: &Html, selector: &scraper::Selector) -> Option<String> {
    document
        .select(selector)
        .find_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn portrait(document: &Html) -> Option<String> {
    document
        .select(&consts::PORTRAIT_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
        .map(str::to_string)
}
