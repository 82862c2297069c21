//! Regex replacement char filter.

use regex::Regex;

use super::CharFilter;
use crate::error::{ConciergeError, Result};

/// Pattern matching every character that is neither a letter, a digit nor whitespace.
pub const PUNCTUATION_PATTERN: &str = r"[^\p{L}\p{N}\s]+";

/// A char filter that replaces characters matching a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| ConciergeError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
        })
    }

    /// Filter that turns every run of punctuation into a single space.
    pub fn punctuation() -> Result<Self> {
        Self::new(PUNCTUATION_PATTERN, " ")
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}
