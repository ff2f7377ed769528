//! Proximity-based co-occurrence between mentions
//!
//! Two mentions interact when few enough tokens separate them in the canonical
//! chapter text. The default window of 25 tokens roughly covers one sentence or
//! two short adjacent ones.

use crate::core::{Mention, RawInteraction};
use crate::text::{char_slice, WordTokenizer};

/// Default maximum number of tokens between two interacting mentions
pub const DEFAULT_WINDOW: usize = 25;

/// Emits raw interactions between mentions that appear close together
#[derive(Debug, Clone)]
pub struct ProximityCooccurrence {
    window: usize,
    tokenizer: WordTokenizer,
}

impl ProximityCooccurrence {
    /// Create a detector with a token window (inclusive)
    pub fn new(window: usize) -> Self {
        Self {
            window,
            tokenizer: WordTokenizer::new(),
        }
    }

    /// Token window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Text strictly between two mentions
    ///
    /// The mention starting first is taken as the left one, whatever the
    /// argument order. Overlapping mentions have an empty gap.
    pub fn gap<'t>(&self, text: &'t str, a: &Mention, b: &Mention) -> &'t str {
        let (first, second) = if a.start <= b.start { (a, b) } else { (b, a) };
        char_slice(text, first.end, second.start)
    }

    /// Whether two mentions are within the window of each other
    pub fn within_window(&self, text: &str, a: &Mention, b: &Mention) -> bool {
        self.tokenizer.fits_within(self.gap(text, a, b), self.window)
    }

    /// Scan every mention pair and collect interactions
    ///
    /// Pairs are formed in list order (`i < j`) and reported as
    /// `(mentions[i].word, mentions[j].word)`. Pairs with identical surface
    /// forms never interact. Nothing is deduplicated: each qualifying pair of
    /// mentions yields its own interaction.
    pub fn interactions(&self, text: &str, mentions: &[Mention]) -> Vec<RawInteraction> {
        let mut interactions = Vec::new();

        for (i, left) in mentions.iter().enumerate() {
            for right in &mentions[i + 1..] {
                if left.word == right.word {
                    continue;
                }
                if self.within_window(text, left, right) {
                    interactions.push(RawInteraction::new(left.word.clone(), right.word.clone()));
                }
            }
        }

        tracing::debug!(
            mentions = mentions.len(),
            interactions = interactions.len(),
            window = self.window,
            "proximity scan complete"
        );
        interactions
    }
}

impl Default for ProximityCooccurrence {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
