// ============================================================================
// src/executor/collation.rs - Locale-aware text ordering
// ============================================================================
//
// Three-level comparison in the style of the root collation used by
// browsers for `localeCompare`:
//
//   1. primary   - base letters only (case and diacritics folded away)
//   2. secondary - diacritics ("resume" < "résumé")
//   3. tertiary  - case, lowercase first ("apple" < "Apple")
//
// Strings equal on all three levels fall back to code point order so the
// result is a total order.
//
// ============================================================================

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn with_marks(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn case_bits(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
}

/// Compare two strings the way a user-facing list should order them.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| with_marks(a).cmp(with_marks(b)))
        .then_with(|| case_bits(a).cmp(case_bits(b)))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_is_not_primary() {
        // byte order would put "Zebra" before "apple"
        assert_eq!(locale_compare("apple", "Zebra"), Ordering::Less);
        assert_eq!(locale_compare("Banana", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_first_on_tie() {
        assert_eq!(locale_compare("apple", "Apple"), Ordering::Less);
        assert_eq!(locale_compare("Apple", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_diacritics_are_secondary() {
        assert_eq!(locale_compare("resume", "résumé"), Ordering::Less);
        assert_eq!(locale_compare("résumé", "resumes"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Eric"), Ordering::Less);
    }

    #[test]
    fn test_composed_and_decomposed_forms_are_equal() {
        assert_eq!(locale_compare("caf\u{e9}", "cafe\u{301}"), "caf\u{e9}".cmp("cafe\u{301}"));
        assert_ne!(locale_compare("caf\u{e9}", "cafe"), Ordering::Equal);
    }

    #[test]
    fn test_empty_sorts_first() {
        assert_eq!(locale_compare("", "a"), Ordering::Less);
        assert_eq!(locale_compare("", ""), Ordering::Equal);
    }
}
