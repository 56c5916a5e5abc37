//! Name normalization applied before similarity scoring.
//!
//! Both the query and every candidate label go through [`normalize`] so that
//! casing, punctuation and diacritics never influence the ranking.

use unicode_normalization::UnicodeNormalization;

/// Normalize a name for comparison.
///
/// 1. Unicode NFKD (fullwidth -> ASCII, "é" -> "e" + combining mark)
/// 2. Lowercase
/// 3. Drop everything outside `[a-z0-9 ]`
pub fn normalize(s: &str) -> String {
    s.nfkd()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("CLANNAD!!"), "clannad");
        assert_eq!(normalize("Dr. Stone"), "dr stone");
        assert_eq!(normalize("Togashi, Yuuta"), "togashi yuuta");
    }

    #[test]
    fn diacritics_fold_to_base_letter() {
        assert_eq!(normalize("Pokémon"), "pokemon");
        assert_eq!(normalize("Shōwa Genroku"), "showa genroku");
    }

    #[test]
    fn fullwidth_folds_to_ascii() {
        assert_eq!(normalize("ＦＵＬＬＷＩＤＴＨ"), "fullwidth");
    }

    #[test]
    fn non_latin_scripts_vanish() {
        assert_eq!(normalize("葬送のフリーレン"), "");
    }

    #[test]
    fn spaces_are_kept_verbatim() {
        assert_eq!(normalize("Re:Zero - Starting"), "rezero  starting");
    }

    #[test]
    fn empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("---"), "");
    }
}
