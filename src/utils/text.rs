// src/utils/text.rs - String normalization shared by the name-matching stack

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Turn periods into spaces and collapse, so "M.I." becomes "m i" when
/// lowercased. Used when splitting given names into tokens.
pub fn periods_to_spaces(s: &str) -> String {
    normalize_whitespace(&s.replace('.', " "))
}

/// Remove periods entirely, so "Seven, P.M." compares equal to the
/// initials form "seven, pm". Used on author strings at match time.
pub fn remove_periods(s: &str) -> String {
    normalize_whitespace(&s.replace('.', ""))
}

/// Fold common Latin diacritics to ASCII for accent-insensitive surname
/// comparison ("Tén" matches the registration surname "Ten"). The folded
/// string is only ever used for comparison; surface forms keep the original
/// spelling.
pub fn fold_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => 'a',
            'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ė' => 'e',
            'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' => 'o',
            'ú' | 'ù' | 'û' | 'ü' | 'ū' => 'u',
            'ý' | 'ÿ' => 'y',
            'ñ' => 'n',
            'ç' => 'c',
            'ß' => 's',
            'ł' => 'l',
            'š' => 's',
            'ž' => 'z',
            'č' => 'c',
            'ř' => 'r',
            'đ' => 'd',
            other => other,
        })
        .collect()
}

/// Case- and accent-insensitive comparison used for surname token matching.
pub fn names_equal(a: &str, b: &str) -> bool {
    fold_diacritics(&a.to_lowercase()) == fold_diacritics(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_to_spaces() {
        assert_eq!(periods_to_spaces("M.I."), "M I");
        assert_eq!(periods_to_spaces("Person4 M."), "Person4 M");
    }

    #[test]
    fn test_remove_periods() {
        assert_eq!(remove_periods("seven, p.m."), "seven, pm");
        assert_eq!(remove_periods("nine isn.pi"), "nine isnpi");
    }

    #[test]
    fn test_accent_insensitive_equality() {
        assert!(names_equal("Tén", "ten"));
        assert!(names_equal("Pérson11", "person11"));
        assert!(!names_equal("Ten", "Tan"));
    }
}
