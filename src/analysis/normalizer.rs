//! Utterance normalization.
//!
//! The [`Normalizer`] is the first stage of every turn: it lowercases the raw
//! text, strips punctuation and collapses whitespace into an ordered token
//! sequence. It never fails. Empty or punctuation-only input produces an empty
//! [`NormalizedUtterance`], which the classifier maps to `UNKNOWN`.
//!
//! # Examples
//!
//! ```
//! use concierge::analysis::Normalizer;
//!
//! let normalizer = Normalizer::new();
//! let utterance = normalizer.normalize("  When is the LIBRARY open?? ");
//!
//! assert_eq!(utterance.tokens(), ["when", "is", "the", "library", "open"]);
//! assert_eq!(utterance.text(), "when is the library open");
//! assert!(normalizer.normalize("?!").is_empty());
//! ```

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;

/// Ordered token sequence derived from one utterance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedUtterance {
    tokens: Vec<String>,
}

impl NormalizedUtterance {
    /// Build an utterance from already-normalized tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// The tokens in input order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the utterance has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Whether a single token occurs.
    pub fn contains(&self, term: &str) -> bool {
        self.tokens.iter().any(|t| t == term)
    }

    /// Start positions of every occurrence of a space-separated phrase.
    pub fn find_phrase(&self, phrase: &str) -> Vec<usize> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() || words.len() > self.tokens.len() {
            return Vec::new();
        }

        (0..=self.tokens.len() - words.len())
            .filter(|&start| {
                words
                    .iter()
                    .enumerate()
                    .all(|(offset, word)| self.tokens[start + offset] == *word)
            })
            .collect()
    }

    /// Whether a space-separated phrase occurs as consecutive tokens.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        !self.find_phrase(phrase).is_empty()
    }
}

/// Lowercasing, punctuation-stripping, whitespace-collapsing tokenizer.
#[derive(Clone)]
pub struct Normalizer {
    analyzer: Arc<dyn Analyzer>,
}

impl Normalizer {
    /// Create the default normalizer.
    pub fn new() -> Self {
        let mut analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("utterance_normalizer");

        match PatternReplaceCharFilter::punctuation() {
            Ok(filter) => analyzer = analyzer.add_char_filter(Arc::new(filter)),
            // The word tokenizer already drops punctuation-only segments.
            Err(e) => warn!("punctuation filter unavailable: {e}"),
        }

        Self::with_analyzer(Arc::new(analyzer))
    }

    /// Create a normalizer backed by a custom analyzer.
    pub fn with_analyzer(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }

    /// Normalize raw text. Never fails.
    pub fn normalize(&self, text: &str) -> NormalizedUtterance {
        match self.analyzer.analyze(text) {
            Ok(tokens) => NormalizedUtterance {
                tokens: tokens
                    .filter(|t| !t.is_stopped() && !t.is_empty())
                    .map(|t| t.text)
                    .collect(),
            },
            Err(e) => {
                warn!("analyzer {} failed, treating input as empty: {e}", self.analyzer.name());
                NormalizedUtterance::default()
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}
