/// Word-budget chunking ahead of NER
pub mod chunking;
/// Word tokenisation and token counting
pub mod tokenizer;

pub use chunking::WordChunker;
pub use tokenizer::{TokenCounter, WordTokenizer};

use regex::Regex;
use std::sync::OnceLock;

/// Collapse every run of whitespace into a single space and trim the ends
///
/// Chapter files are normalised this way before chunking so that joining the
/// chunks with single spaces reproduces the text the tagger saw.
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(text.trim(), " ").into_owned()
}

/// Slice `text` by character offsets, clamping both ends
///
/// Out-of-range or inverted offsets produce a shorter or empty slice rather
/// than a panic; upstream taggers occasionally report offsets past the end of
/// their chunk.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }

    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let Some(byte_start) = indices.nth(start) else {
        return "";
    };
    let byte_end = indices.nth(end - start - 1).unwrap_or(text.len());

    &text[byte_start..byte_end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Hari\n\tSeldon   sourit.\n\n"),
            "Hari Seldon sourit."
        );
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_char_slice_counts_characters() {
        let text = "Cléon et Demerzel";
        assert_eq!(char_slice(text, 0, 5), "Cléon");
        assert_eq!(char_slice(text, 5, 9), " et ");
        assert_eq!(char_slice(text, 9, 17), "Demerzel");
    }

    #[test]
    fn test_char_slice_tolerates_bad_offsets() {
        let text = "Dors";
        assert_eq!(char_slice(text, 2, 40), "rs");
        assert_eq!(char_slice(text, 10, 40), "");
        assert_eq!(char_slice(text, 3, 1), "");
        assert_eq!(char_slice(text, 4, 5), "");
    }
}
