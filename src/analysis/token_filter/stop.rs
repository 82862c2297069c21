//! Stop filter implementation.
//!
//! Removes function words that carry no intent signal ("the", "is", "a", ...).
//! Used by the statistical classifier's feature analyzer; the engine's
//! normalizer keeps every token because slot extraction needs them.
//!
//! # Examples
//!
//! ```
//! use concierge::analysis::token_filter::Filter;
//! use concierge::analysis::token_filter::stop::StopFilter;
//! use concierge::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![
//!     Token::new("where", 0),
//!     Token::new("is", 1),
//!     Token::new("the", 2),
//!     Token::new("gym", 3),
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[1].text, "gym");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words.
///
/// Question words ("where", "when", "what") are not stop words.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "could", "do", "does", "i",
    "if", "in", "into", "is", "it", "me", "my", "of", "on", "or", "please", "s", "such", "that",
    "the", "their", "then", "there", "these", "they", "this", "to", "was", "will", "with",
    "would", "you",
];

static DEFAULT_STOP_WORDS_SET: LazyLock<Arc<HashSet<String>>> = LazyLock::new(|| {
    Arc::new(
        DEFAULT_ENGLISH_STOP_WORDS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
});

/// A filter that removes (or marks) stop words.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
    remove_stopped: bool,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    pub fn new() -> Self {
        StopFilter {
            stop_words: DEFAULT_STOP_WORDS_SET.clone(),
            remove_stopped: true,
        }
    }

    /// Create a stop filter from a custom word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            stop_words: Arc::new(words.into_iter().map(Into::into).collect()),
            remove_stopped: true,
        }
    }

    /// Keep stopped tokens in the stream, only marking them.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }

    /// Check whether a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Number of stop words in this filter.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Whether the stop word list is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let marked: Vec<Token> = tokens
            .map(|token| {
                if !token.is_stopped() && self.is_stop_word(&token.text) {
                    token.stop()
                } else {
                    token
                }
            })
            .filter(|token| !(self.remove_stopped && token.is_stopped()))
            .collect();

        Ok(Box::new(marked.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
