use crate::core::{Chunk, Mention};

/// Mentions re-based onto the canonical chapter text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMentions {
    /// Chunk texts joined with single spaces
    pub text: String,
    /// Every mention, in chunk order then within-chunk order, with global offsets
    pub mentions: Vec<Mention>,
    /// Global character offset at which each chunk starts
    pub chunk_offsets: Vec<usize>,
}

impl IndexedMentions {
    /// Whether no mention was found in any chunk
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }
}

/// Turns chunk-local mention offsets into offsets on the joined text
///
/// A running cursor starts at 0; each chunk's mentions are shifted by the
/// cursor, then the cursor advances by the chunk length plus one for the join
/// separator. Chunks must be supplied in reading order and chunks without
/// mentions still advance the cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionIndexer;

impl MentionIndexer {
    /// Create an indexer
    pub fn new() -> Self {
        Self
    }

    /// Flatten chunks into globally indexed mentions and the canonical text
    ///
    /// Offsets that overflow their own chunk are shifted like any other; the
    /// resulting spans may then point into the next chunk or past the end of
    /// the text. That is tolerated here and clamped wherever text is sliced.
    pub fn index(&self, chunks: Vec<Chunk>) -> IndexedMentions {
        let mut indexed = IndexedMentions {
            text: String::new(),
            mentions: Vec::with_capacity(chunks.iter().map(|c| c.mentions.len()).sum()),
            chunk_offsets: Vec::with_capacity(chunks.len()),
        };
        let mut cursor = 0usize;

        for (i, chunk) in chunks.into_iter().enumerate() {
            if i > 0 {
                indexed.text.push(' ');
            }
            indexed.chunk_offsets.push(cursor);

            let chunk_len = chunk.char_len();
            for mut mention in chunk.mentions {
                if mention.end > chunk_len {
                    tracing::debug!(
                        word = %mention.word,
                        end = mention.end,
                        chunk_len,
                        "mention offsets exceed their chunk"
                    );
                }
                mention.shift(cursor);
                indexed.mentions.push(mention);
            }

            indexed.text.push_str(&chunk.text);
            cursor += chunk_len + 1;
        }

        indexed
    }
}
