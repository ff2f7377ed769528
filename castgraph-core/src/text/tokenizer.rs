//! Word tokenisation
//!
//! The proximity window is measured in tokens: words (including elided and
//! hyphenated forms such as `s'inclina` or `Goutte-de-Pluie`), ellipses and
//! individual punctuation marks each count as one token.

use crate::{CastGraphError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_REGEX.get_or_init(|| Regex::new(r"\w+(?:['’\-]\w+)*|\.\.\.|…|[^\w\s]").unwrap())
}

/// Splits text into word and punctuation tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Create a tokenizer
    pub fn new() -> Self {
        Self
    }

    /// All tokens of `text`, in order
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        token_pattern().find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Number of tokens in `text`
    pub fn count(&self, text: &str) -> usize {
        token_pattern().find_iter(text).count()
    }

    /// Whether `text` holds at most `max_tokens` tokens
    ///
    /// Scanning stops at the first token past the limit, so long gaps between
    /// distant mentions cost no more than the window itself.
    pub fn fits_within(&self, text: &str, max_tokens: usize) -> bool {
        token_pattern()
            .find_iter(text)
            .take(max_tokens.saturating_add(1))
            .count()
            <= max_tokens
    }
}

#[derive(Debug, Clone, Default)]
enum TokenState {
    #[default]
    Empty,
    Tokenized(Vec<String>),
}

/// Token counter that only reports a count once it has tokenised some text
///
/// Starts `Empty`; [`TokenCounter::tokenize`] moves it to `Tokenized`.
/// Asking for the count before that is a [`CastGraphError::NotReady`] error.
#[derive(Debug, Clone, Default)]
pub struct TokenCounter {
    tokenizer: WordTokenizer,
    state: TokenState,
}

impl TokenCounter {
    /// Create an empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenise `text`, replacing anything tokenised before
    pub fn tokenize(&mut self, text: &str) -> &[String] {
        let tokens = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .map(str::to_string)
            .collect();
        self.state = TokenState::Tokenized(tokens);
        match &self.state {
            TokenState::Tokenized(tokens) => tokens,
            TokenState::Empty => &[],
        }
    }

    /// Whether text has been tokenised
    pub fn is_tokenized(&self) -> bool {
        matches!(self.state, TokenState::Tokenized(_))
    }

    /// Tokens from the last call to [`TokenCounter::tokenize`]
    pub fn tokens(&self) -> Result<&[String]> {
        match &self.state {
            TokenState::Tokenized(tokens) => Ok(tokens),
            TokenState::Empty => Err(CastGraphError::NotReady {
                component: "TokenCounter".to_string(),
                expected: "tokenize() must be called before reading tokens".to_string(),
            }),
        }
    }

    /// Number of tokens from the last call to [`TokenCounter::tokenize`]
    pub fn count(&self) -> Result<usize> {
        self.tokens().map(<[String]>::len)
    }

    /// Return to the `Empty` state
    pub fn reset(&mut self) {
        self.state = TokenState::Empty;
    }
}
