//! Mapping from internal item names to candidate wiki page titles.
//!
//! Internal names are lowercase snake_case (`byakkos_haidate`); wiki page
//! titles are underscore-joined title case with URL-encoded apostrophes
//! (`Byakko%27s_Haidate`). The mapping is pure string work driven by a few
//! fixed tables.

use lazy_static::lazy_static;
use regex::Regex;

/// Possessive rewrites for gear named after its original owner. The trailing
/// `s` of the first token is really an apostrophe-s the exporter flattened.
const POSSESSIVE_PREFIXES: [(&str, &str); 5] = [
    ("byakkos_", "byakko's_"),
    ("genbus_", "genbu's_"),
    ("kirins_", "kirin's_"),
    ("seiryus_", "seiryu's_"),
    ("suzakus_", "suzaku's_"),
];

/// Full-name overrides where no casing rule produces the real page title.
const TITLE_OVERRIDES: [(&str, &str); 1] = [("lock_of_sirens_hair", "Siren%27s_Hair")];

/// Words kept lowercase unless they lead the title.
const SMALL_WORDS: [&str; 12] = [
    "of", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
];

/// Descriptive container prefixes; pages are often filed under the bare
/// material name instead.
const CONTAINER_PREFIXES: [&str; 8] = [
    "Piece_of_",
    "Spool_of_",
    "Vial_of_",
    "Square_of_",
    "Slice_of_",
    "Lock_of_",
    "Scroll_of_",
    "Gem_of_",
];

const COLOR_ADJECTIVES: [&str; 5] = ["Black_", "White_", "Red_", "Blue_", "Green_"];

lazy_static! {
    static ref ROMAN_NUMERAL: Regex = Regex::new(r"(?i)^(i|ii|iii|iv|v|vi)$").unwrap();
}

/// Map an internal item name to its primary wiki page title.
pub fn wiki_title(db_name: &str) -> String {
    for (name, title) in TITLE_OVERRIDES {
        if db_name == name {
            return title.to_string();
        }
    }

    let mut name = db_name.to_string();
    for (prefix, possessive) in POSSESSIVE_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = format!("{}{}", possessive, rest);
            break;
        }
    }

    let title = name
        .split('_')
        .enumerate()
        .map(|(index, word)| cased_token(index, word))
        .collect::<Vec<_>>()
        .join("_");

    // Abjuration pages are categorized: Earthen_Abjuration:_Head
    let title = title.replace("_Abjuration_", "_Abjuration:_");

    title.replace('\'', "%27")
}

fn cased_token(index: usize, word: &str) -> String {
    if ROMAN_NUMERAL.is_match(word) {
        return word.to_uppercase();
    }
    if index > 0 && SMALL_WORDS.contains(&word.to_lowercase().as_str()) {
        return word.to_lowercase();
    }
    if word.contains('-') {
        return word
            .split('-')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join("-");
    }
    capitalize(word)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Ordered candidate titles for an internal name. The primary mapping is
/// always first; container-prefix and color-stripped fallbacks follow for
/// materials the wiki files under a shorter name.
pub fn wiki_title_candidates(db_name: &str) -> Vec<String> {
    let primary = wiki_title(db_name);
    let mut candidates = vec![primary.clone()];

    for prefix in CONTAINER_PREFIXES {
        if let Some(suffix) = primary.strip_prefix(prefix) {
            candidates.push(suffix.to_string());

            for color in COLOR_ADJECTIVES {
                if let Some(bare) = suffix.strip_prefix(color) {
                    candidates.push(bare.to_string());
                }
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_possessive_prefix() {
        assert_eq!(wiki_title("byakkos_haidate"), "Byakko%27s_Haidate");
        assert_eq!(wiki_title("genbus_kabuto"), "Genbu%27s_Kabuto");
    }

    #[test]
    fn test_override_table() {
        assert_eq!(wiki_title("lock_of_sirens_hair"), "Siren%27s_Hair");
    }

    #[test]
    fn test_abjuration_colon() {
        let title = wiki_title("earthen_abjuration_head");
        assert_eq!(title, "Earthen_Abjuration:_Head");
        assert!(title.contains("Abjuration:_"));
        assert!(!title.contains("Abjuration_Head"));
    }

    #[test]
    fn test_small_words_stay_lowercase() {
        assert_eq!(wiki_title("gem_of_the_east"), "Gem_of_the_East");
    }

    #[test]
    fn test_small_word_capitalized_when_first() {
        assert_eq!(wiki_title("the_big_one"), "The_Big_One");
    }

    #[test]
    fn test_roman_numerals_uppercased() {
        assert_eq!(wiki_title("cure_iv"), "Cure_IV");
        assert_eq!(wiki_title("utsusemi_ni"), "Utsusemi_Ni");
    }

    #[test]
    fn test_hyphenated_tokens() {
        assert_eq!(wiki_title("suzakus_sune-ate"), "Suzaku%27s_Sune-Ate");
        assert_eq!(wiki_title("tonbo-giri"), "Tonbo-Giri");
    }

    #[test]
    fn test_plain_name_single_candidate() {
        let candidates = wiki_title_candidates("scarecrow_scythe");
        assert_eq!(candidates, vec!["Scarecrow_Scythe".to_string()]);
    }

    #[test]
    fn test_first_candidate_is_primary_mapping() {
        let candidates = wiki_title_candidates("byakkos_haidate");
        assert_eq!(candidates[0], "Byakko%27s_Haidate");
    }

    #[test]
    fn test_container_prefix_variants() {
        let candidates = wiki_title_candidates("vial_of_black_beetle_blood");
        assert_eq!(
            candidates,
            vec![
                "Vial_of_Black_Beetle_Blood".to_string(),
                "Black_Beetle_Blood".to_string(),
                "Beetle_Blood".to_string(),
            ]
        );
    }

    #[test]
    fn test_container_prefix_without_color() {
        let candidates = wiki_title_candidates("spool_of_gold_thread");
        assert_eq!(
            candidates,
            vec!["Spool_of_Gold_Thread".to_string(), "Gold_Thread".to_string()]
        );
    }

    #[test]
    fn test_mapping_is_fixed_point() {
        let once = wiki_title("scarecrow_scythe");
        assert_eq!(wiki_title(&once.to_lowercase()), once);
    }
}
