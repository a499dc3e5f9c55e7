//! Text normalization and prefix expansion.
//!
//! The same rules are applied when a term is indexed and when a query is
//! tokenized, so a query word matches an index key only if both normalize to
//! the same string.
//!
//! ## Word characters
//!
//! A character survives normalization if it is a literal space or matches
//! `\w` in the `regex` crate. That class is Unicode-aware: letters and marks
//! from any script, decimal digits, connector punctuation (`_`) and join
//! controls. For ASCII input this is exactly `[A-Za-z0-9_]`.
//!
//! Lengths (minimum prefix length, minimum query word length) are counted in
//! characters, never bytes, so a prefix never splits a code point.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest prefix written to the index
pub const MIN_PREFIX_LEN: usize = 2;

/// Separator between words in a cache key suffix
pub const CACHE_WORD_SEPARATOR: &str = "|";

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w ]").expect("non-word character regex"));

/// Lowercase `text` and strip every character that is not a word character
/// or a space.
///
/// Lowercasing runs first so that characters produced by case folding go
/// through the same filter, which keeps the function idempotent.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_WORD.replace_all(&lower, "").into_owned()
}

/// Every index prefix for `phrase`: for each space-separated word of the
/// normalized phrase, its prefixes of length `MIN_PREFIX_LEN..=len`.
///
/// Duplicates across words are kept; they land on the same index key.
pub fn prefixes_for_phrase(phrase: &str) -> Vec<String> {
    let normalized = normalize(phrase);
    let mut prefixes = Vec::new();

    for word in normalized.split(' ') {
        // Byte offset just past each character
        let ends: Vec<usize> = word
            .char_indices()
            .map(|(start, c)| start + c.len_utf8())
            .collect();

        for &end in ends.iter().skip(MIN_PREFIX_LEN - 1) {
            prefixes.push(word[..end].to_string());
        }
    }

    prefixes
}

/// Normalize a query and keep the words of at least `min_len` characters,
/// sorted so that word order does not matter.
pub fn query_words(query: &str, min_len: usize) -> Vec<String> {
    let mut words: Vec<String> = normalize(query)
        .split(' ')
        .filter(|word| word.chars().count() >= min_len)
        .map(str::to_string)
        .collect();
    words.sort();
    words
}

/// Canonical cache key suffix for a sorted word list.
pub fn cache_suffix(words: &[String]) -> String {
    words.join(CACHE_WORD_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("Apple-Pie!"), "applepie");
        assert_eq!(normalize("Ben & Jerry's"), "ben  jerrys");
        assert_eq!(normalize("snake_case 42"), "snake_case 42");
        assert_eq!(normalize("tab\tand\nnewline"), "tabandnewline");
    }

    #[test]
    fn test_normalize_unicode_letters() {
        assert_eq!(normalize("Crème Brûlée"), "crème brûlée");
        assert_eq!(normalize("ÜBER—straße"), "überstraße");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "",
            "Apple Pie",
            "  double  spaces ",
            "Crème Brûlée!",
            "İstanbul",
            "ΣΊΣΥΦΟΣ",
            "emoji 🍎 apple",
            "a_b-c.d,e",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_prefix_count_per_word() {
        let prefixes = prefixes_for_phrase("apple");
        assert_eq!(prefixes, vec!["ap", "app", "appl", "apple"]);

        // L - 1 prefixes for a word of length L
        assert_eq!(prefixes_for_phrase("ab").len(), 1);
        assert!(prefixes_for_phrase("a").is_empty());
        assert!(prefixes_for_phrase("").is_empty());
    }

    #[test]
    fn test_prefixes_multiple_words() {
        let prefixes = prefixes_for_phrase("Apple Pie");
        assert_eq!(prefixes, vec!["ap", "app", "appl", "apple", "pi", "pie"]);

        // Double spaces produce empty words that contribute nothing
        let prefixes = prefixes_for_phrase("x  pie");
        assert_eq!(prefixes, vec!["pi", "pie"]);
    }

    #[test]
    fn test_prefixes_respect_char_boundaries() {
        let prefixes = prefixes_for_phrase("café");
        assert_eq!(prefixes, vec!["ca", "caf", "café"]);
    }

    #[test]
    fn test_query_words_sorted_and_filtered() {
        assert_eq!(query_words("Pie apple", 3), vec!["apple", "pie"]);
        assert_eq!(query_words("a an the", 3), vec!["the"]);
        assert!(query_words("a", 3).is_empty());
        assert!(query_words("   ", 3).is_empty());
        assert_eq!(query_words("été x", 3), vec!["été"]);
    }

    #[test]
    fn test_cache_suffix() {
        let words = query_words("split banana", 3);
        assert_eq!(cache_suffix(&words), "banana|split");
        assert_eq!(cache_suffix(&query_words("banana split", 3)), "banana|split");
    }
}
