use scraper::ElementRef;

/// All text below an element, whitespace runs collapsed to one space.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "Togashi, Yuuta" -> "Togashi Yuuta".
pub(crate) fn remove_commas(name: &str) -> String {
    name.replace(',', "")
}
