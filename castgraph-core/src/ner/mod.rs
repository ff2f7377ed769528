//! Named-entity recognition collaborator interface
//!
//! The neural tagger lives outside this crate. It is reached through the
//! [`MentionExtractor`] trait and injected into the pipeline, so a chapter run
//! never loads models or talks to services behind the caller's back. This
//! module also provides the filtering applied to every tagger's output and two
//! deterministic extractors: `<PER>`-tagged text and a name gazetteer.

/// Gazetteer-based extractor for known character names
pub mod gazetteer;
/// `<PER> … </PER>` annotated text
pub mod tagged;

pub use gazetteer::GazetteerExtractor;
pub use tagged::{parse_tagged_text, render_tagged_text, TaggedDocument, TaggedSpan};

use crate::config::NerConfig;
use crate::core::{Chunk, Mention};
use crate::text::WordChunker;
use crate::Result;

/// Source of mentions for one chunk of text
///
/// Offsets in the returned mentions are character offsets local to `chunk`.
/// Implementations may return any entity group; filtering to persons happens
/// in [`MentionFilter`].
pub trait MentionExtractor: Send + Sync {
    /// Extract mentions from one chunk
    fn extract(&self, chunk: &str) -> Result<Vec<Mention>>;

    /// Name used in logs
    fn name(&self) -> &str {
        "ner"
    }
}

impl<F> MentionExtractor for F
where
    F: Fn(&str) -> Result<Vec<Mention>> + Send + Sync,
{
    fn extract(&self, chunk: &str) -> Result<Vec<Mention>> {
        self(chunk)
    }
}

/// Keeps person mentions long enough to be names
#[derive(Debug, Clone)]
pub struct MentionFilter {
    person_groups: Vec<String>,
    min_mention_chars: usize,
}

impl MentionFilter {
    /// Create a filter
    pub fn new(person_groups: Vec<String>, min_mention_chars: usize) -> Self {
        Self {
            person_groups,
            min_mention_chars,
        }
    }

    /// Whether a mention survives filtering
    pub fn keep(&self, mention: &Mention) -> bool {
        mention.char_len() > self.min_mention_chars
            && self
                .person_groups
                .iter()
                .any(|group| group.eq_ignore_ascii_case(&mention.entity_group))
    }

    /// Filter a chunk's mentions, preserving order
    pub fn apply(&self, mentions: Vec<Mention>) -> Vec<Mention> {
        mentions.into_iter().filter(|m| self.keep(m)).collect()
    }
}

impl Default for MentionFilter {
    fn default() -> Self {
        Self::from(&NerConfig::default())
    }
}

impl From<&NerConfig> for MentionFilter {
    fn from(config: &NerConfig) -> Self {
        Self::new(config.person_groups.clone(), config.min_mention_chars)
    }
}

/// Tagger output for a whole chapter, as dumped to JSON
///
/// `{"chunks": [{"text": "...", "mentions": [{"word", "start", "end", "entity_group"}]}]}`
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NerDocument {
    /// Chunks in reading order
    pub chunks: Vec<Chunk>,
}

impl NerDocument {
    /// Parse a JSON dump
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON dump from disk
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Drop mentions the filter rejects, keeping every chunk
    pub fn filtered(self, filter: &MentionFilter) -> Vec<Chunk> {
        self.chunks
            .into_iter()
            .map(|chunk| Chunk::new(chunk.text, filter.apply(chunk.mentions)))
            .collect()
    }
}

/// Run an extractor over a chapter, chunk by chunk
///
/// The text is split with `chunker`, each chunk is passed to `extractor` in
/// order, and the output is filtered. Chunks without mentions are kept, as
/// they still take part in offset arithmetic.
pub fn extract_chunks(
    text: &str,
    chunker: &WordChunker,
    extractor: &dyn MentionExtractor,
    filter: &MentionFilter,
) -> Result<Vec<Chunk>> {
    let pieces = chunker.chunk_text(text);
    let mut chunks = Vec::with_capacity(pieces.len());

    for (index, piece) in pieces.into_iter().enumerate() {
        let raw = extractor.extract(&piece)?;
        let raw_count = raw.len();
        let mentions = filter.apply(raw);
        tracing::debug!(
            extractor = extractor.name(),
            chunk = index,
            raw = raw_count,
            kept = mentions.len(),
            "extracted mentions"
        );
        chunks.push(Chunk::new(piece, mentions));
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CastGraphError;

    #[test]
    fn test_filter_keeps_long_person_mentions() {
        let filter = MentionFilter::default();
        assert!(filter.keep(&Mention::with_group("Hari", 0, 4, "PER")));
        assert!(filter.keep(&Mention::with_group("Hari", 0, 4, "PERSON")));
        assert!(!filter.keep(&Mention::with_group("Trantor", 0, 7, "LOC")));
        assert!(!filter.keep(&Mention::with_group("H", 0, 1, "PER")));
    }

    #[test]
    fn test_extract_chunks_keeps_empty_chunks() {
        let extractor = |chunk: &str| -> Result<Vec<Mention>> {
            Ok(chunk
                .find("Dors")
                .map(|i| vec![Mention::new("Dors", i, i + 4)])
                .unwrap_or_default())
        };
        let chunker = WordChunker::new(2).unwrap();
        let chunks = extract_chunks(
            "Dors sourit. Il pleuvait. Dors partit.",
            &chunker,
            &extractor,
            &MentionFilter::default(),
        )
        .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].mentions.len(), 1);
        assert!(chunks[1].mentions.is_empty());
        assert_eq!(chunks[2].text, "Dors partit.");
    }

    #[test]
    fn test_extractor_errors_propagate() {
        let failing = |_: &str| -> Result<Vec<Mention>> {
            Err(CastGraphError::EntityExtraction {
                message: "model unavailable".to_string(),
            })
        };
        let result = extract_chunks(
            "Seldon",
            &WordChunker::default(),
            &failing,
            &MentionFilter::default(),
        );
        assert!(matches!(result, Err(CastGraphError::EntityExtraction { .. })));
    }

    #[test]
    fn test_ner_document_from_json() {
        let json = r#"{"chunks": [
            {"text": "Hari et Trantor", "mentions": [
                {"word": "Hari", "start": 0, "end": 4, "entity_group": "PER"},
                {"word": "Trantor", "start": 8, "end": 15, "entity_group": "LOC"}
            ]},
            {"text": "rien"}
        ]}"#;
        let chunks = NerDocument::from_json(json)
            .unwrap()
            .filtered(&MentionFilter::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].mentions, vec![Mention::new("Hari", 0, 4)]);
        assert!(chunks[1].mentions.is_empty());
        assert!(NerDocument::from_json("{").is_err());
    }
}
