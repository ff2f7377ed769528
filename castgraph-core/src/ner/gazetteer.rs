use crate::core::{Mention, PERSON_GROUP};
use crate::ner::MentionExtractor;
use crate::{CastGraphError, Result};
use regex::Regex;

/// Extracts occurrences of known character names
///
/// Names are matched case-sensitively on word boundaries, longest name first,
/// so "Hari Seldon" wins over "Hari" at the same position. Useful as a
/// deterministic stand-in for a neural tagger when the cast is known.
#[derive(Debug, Clone)]
pub struct GazetteerExtractor {
    pattern: Option<Regex>,
    names: Vec<String>,
}

impl GazetteerExtractor {
    /// Build an extractor from a list of names
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        names.dedup();

        let pattern = if names.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
            let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).map_err(
                |e| CastGraphError::EntityExtraction {
                    message: format!("invalid gazetteer: {e}"),
                },
            )?;
            Some(pattern)
        };

        Ok(Self { pattern, names })
    }

    /// Known names, longest first
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl MentionExtractor for GazetteerExtractor {
    fn extract(&self, chunk: &str) -> Result<Vec<Mention>> {
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };

        let mut mentions = Vec::new();
        let mut byte_cursor = 0;
        let mut char_cursor = 0;

        for found in pattern.find_iter(chunk) {
            char_cursor += chunk[byte_cursor..found.start()].chars().count();
            let start = char_cursor;
            let len = found.as_str().chars().count();
            mentions.push(Mention::with_group(found.as_str(), start, start + len, PERSON_GROUP));
            char_cursor += len;
            byte_cursor = found.end();
        }

        Ok(mentions)
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::char_slice;

    #[test]
    fn test_longest_name_wins() {
        let extractor = GazetteerExtractor::new(["Hari", "Hari Seldon", "Seldon"]).unwrap();
        let text = "Hari Seldon rencontra Hari puis Seldon.";
        let words: Vec<String> = extractor
            .extract(text)
            .unwrap()
            .into_iter()
            .map(|m| m.word)
            .collect();
        assert_eq!(words, vec!["Hari Seldon", "Hari", "Seldon"]);
    }

    #[test]
    fn test_offsets_are_characters() {
        let extractor = GazetteerExtractor::new(["Cléon", "Demerzel"]).unwrap();
        let text = "Où était Cléon ? Demerzel l'ignorait.";
        for mention in extractor.extract(text).unwrap() {
            assert_eq!(char_slice(text, mention.start, mention.end), mention.word);
        }
    }

    #[test]
    fn test_empty_gazetteer_finds_nothing() {
        let extractor = GazetteerExtractor::new(Vec::<String>::new()).unwrap();
        assert!(extractor.extract("Hari").unwrap().is_empty());
        assert_eq!(extractor.name(), "gazetteer");
    }
}
