//! Word-budget chunking for the NER collaborator
//!
//! Chunks never split a word, and joining them with single spaces gives back
//! the normalised chapter text the mention indexer's offsets are based on.

use crate::{CastGraphError, Result};

/// Splits whitespace-normalised text into chunks of at most `max_words` words
#[derive(Debug, Clone)]
pub struct WordChunker {
    max_words: usize,
}

impl WordChunker {
    /// Create a chunker with the given word budget
    pub fn new(max_words: usize) -> Result<Self> {
        if max_words == 0 {
            return Err(CastGraphError::TextProcessing {
                message: "chunk word budget must be at least 1".to_string(),
            });
        }
        Ok(Self { max_words })
    }

    /// Word budget per chunk
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Split text into ordered chunks
    ///
    /// Whitespace inside the text is collapsed to single spaces. Empty text
    /// yields no chunks.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        words
            .chunks(self.max_words)
            .map(|chunk| chunk.join(" "))
            .collect()
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self { max_words: 500 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize_whitespace;

    #[test]
    fn test_chunks_respect_word_budget() {
        let chunker = WordChunker::new(3).unwrap();
        let chunks = chunker.chunk_text("Hari Seldon regarda Dors Venabili sans rien dire");
        assert_eq!(
            chunks,
            vec!["Hari Seldon regarda", "Dors Venabili sans", "rien dire"]
        );
    }

    #[test]
    fn test_joined_chunks_rebuild_normalised_text() {
        let raw = "  Demerzel  s'inclina.\n\nCléon   ne répondit pas. ";
        let chunker = WordChunker::new(2).unwrap();
        let chunks = chunker.chunk_text(raw);
        assert_eq!(chunks.join(" "), normalize_whitespace(raw));
    }

    #[test]
    fn test_empty_text_and_zero_budget() {
        assert!(WordChunker::default().chunk_text("   ").is_empty());
        assert!(WordChunker::new(0).is_err());
    }
}
