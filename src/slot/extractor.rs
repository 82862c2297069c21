//! Slot extraction.
//!
//! [`SlotExtractor`] fills the slots of one intent's schema from a normalized
//! utterance. The returned map always contains every schema slot; slots with
//! nothing recognised are `Empty`.

use chrono::NaiveDate;
use log::debug;
use regex::Regex;

use crate::analysis::NormalizedUtterance;
use crate::error::{ConciergeError, Result};
use crate::intent::Intent;
use crate::slot::date::{find_dates, is_calendar_word};
use crate::slot::schema::{SlotSchema, SlotSpec, SlotType};
use crate::slot::value::{SlotFill, SlotMap, SlotValue};
use crate::slot::vocabulary::Vocabulary;
use crate::slot::SlotName;

/// Per-turn inputs that are not part of the utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractionContext {
    /// Day that relative dates resolve against.
    pub reference_date: NaiveDate,
    /// Slot the user was last prompted for, if any.
    pub pending_slot: Option<SlotName>,
}

impl ExtractionContext {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            pending_slot: None,
        }
    }

    pub fn with_pending(mut self, pending_slot: Option<SlotName>) -> Self {
        self.pending_slot = pending_slot;
        self
    }
}

/// Trait for slot extraction backends.
pub trait SlotExtractor: Send + Sync {
    /// Extract the slots of `intent`'s schema from the utterance.
    fn extract(
        &self,
        intent: Intent,
        utterance: &NormalizedUtterance,
        context: &ExtractionContext,
    ) -> SlotMap;

    /// Get the name of this extractor for debugging and logging.
    fn name(&self) -> &str;
}

const STRONG_TITLE_TRIGGERS: &[&str] = &["titled", "called", "named", "about"];
const WEAK_TITLE_TRIGGERS: &[&str] = &[
    "book", "books", "borrow", "find", "search", "novel", "textbook",
];
const TITLE_FILLERS: &[&str] = &[
    "a", "about", "an", "any", "book", "books", "borrow", "called", "copies", "copy", "find",
    "for", "i", "is", "it", "its", "looking", "me", "named", "need", "novel", "of", "on", "one",
    "please", "s", "search", "some", "textbook", "the", "titled", "to", "want",
];
const TITLE_BOUNDARY_WORDS: &[&str] = &[
    "anywhere", "available", "by", "now", "please", "today", "tomorrow",
];
const TITLE_BOUNDARY_PHRASES: &[&[&str]] = &[
    &["in", "the", "library"],
    &["at", "the", "library"],
    &["from", "the", "library"],
    &["in", "library"],
    &["in", "stock"],
    &["do", "you"],
    &["is", "it"],
    &["are", "there"],
];

/// Words that look like a course prefix but never are.
const NON_COURSE_PREFIXES: &[&str] = &[
    "about", "and", "are", "as", "at", "bay", "be", "bus", "by", "call", "code", "day", "days",
    "desk", "do", "exam", "exams", "for", "from", "gate", "hall", "has", "have", "hour", "in",
    "into", "is", "it", "lab", "labs", "lot", "me", "my", "near", "no", "of", "on", "open",
    "or", "our", "page", "past", "quiz", "room", "seat", "sem", "slot", "term", "test", "the",
    "till", "to", "unit", "up", "upto", "was", "week", "wing", "with", "year", "your",
];

/// Keyword and pattern based extractor.
#[derive(Clone, Debug)]
pub struct RuleBasedSlotExtractor {
    course_id: Regex,
    course_prefix: Regex,
    course_number: Regex,
}

impl RuleBasedSlotExtractor {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ConciergeError::analysis(format!("Invalid course id pattern '{pattern}': {e}"))
            })
        };
        Ok(Self {
            course_id: compile(r"^([a-z]{2,4})(\d{3,4}[a-z]?)$")?,
            course_prefix: compile(r"^[a-z]{2,4}$")?,
            course_number: compile(r"^\d{3,4}[a-z]?$")?,
        })
    }

    fn extract_slot(
        &self,
        spec: &SlotSpec,
        utterance: &NormalizedUtterance,
        context: &ExtractionContext,
    ) -> SlotFill {
        match spec.kind {
            SlotType::Date => Self::extract_date(utterance, context.reference_date),
            SlotType::Identifier => self.extract_course_ids(utterance),
            SlotType::Enum(vocabulary) => Self::extract_choice(vocabulary, utterance),
            SlotType::String => {
                Self::extract_title(utterance, context.pending_slot == Some(spec.name))
            }
        }
    }

    fn extract_date(utterance: &NormalizedUtterance, reference: NaiveDate) -> SlotFill {
        let candidates = find_dates(utterance.tokens(), reference)
            .iter()
            .flat_map(|mention| mention.candidates())
            .map(SlotValue::Date)
            .collect();
        SlotFill::from_candidates(candidates)
    }

    fn extract_course_ids(&self, utterance: &NormalizedUtterance) -> SlotFill {
        let tokens = utterance.tokens();
        let mut ids = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if let Some(caps) = self.course_id.captures(token) {
                if !NON_COURSE_PREFIXES.contains(&&caps[1]) && !is_calendar_word(&caps[1]) {
                    ids.push(token.to_uppercase());
                }
                continue;
            }

            let Some(next) = tokens.get(i + 1) else {
                continue;
            };
            if self.course_prefix.is_match(token)
                && self.course_number.is_match(next)
                && !NON_COURSE_PREFIXES.contains(&token.as_str())
                && !is_calendar_word(token)
            {
                ids.push(format!("{token}{next}").to_uppercase());
            }
        }

        SlotFill::from_candidates(ids.into_iter().map(SlotValue::Identifier).collect())
    }

    fn extract_choice(vocabulary: &Vocabulary, utterance: &NormalizedUtterance) -> SlotFill {
        SlotFill::from_candidates(
            vocabulary
                .lookup(utterance)
                .into_iter()
                .map(|canonical| SlotValue::Choice(canonical.to_string()))
                .collect(),
        )
    }

    /// Book titles. When the title is the pending question the whole utterance
    /// answers it; otherwise the title follows a trigger word.
    fn extract_title(utterance: &NormalizedUtterance, pending: bool) -> SlotFill {
        let tokens = utterance.tokens();

        let start = if pending {
            Some(0)
        } else {
            Self::position_after(tokens, STRONG_TITLE_TRIGGERS)
                .or_else(|| Self::position_after(tokens, WEAK_TITLE_TRIGGERS))
        };
        let Some(mut start) = start else {
            return SlotFill::Empty;
        };

        while start < tokens.len() && TITLE_FILLERS.contains(&tokens[start].as_str()) {
            start += 1;
        }

        let mut end = start;
        while end < tokens.len() && !Self::is_title_boundary(tokens, end) {
            end += 1;
        }

        if start == end {
            return SlotFill::Empty;
        }
        SlotFill::Filled(SlotValue::Text(tokens[start..end].join(" ")))
    }

    fn position_after(tokens: &[String], triggers: &[&str]) -> Option<usize> {
        tokens
            .iter()
            .position(|t| triggers.contains(&t.as_str()))
            .map(|i| i + 1)
    }

    fn is_title_boundary(tokens: &[String], at: usize) -> bool {
        TITLE_BOUNDARY_WORDS.contains(&tokens[at].as_str())
            || TITLE_BOUNDARY_PHRASES.iter().any(|phrase| {
                phrase.len() <= tokens.len() - at
                    && phrase.iter().zip(&tokens[at..]).all(|(p, t)| *p == t.as_str())
            })
    }
}

impl SlotExtractor for RuleBasedSlotExtractor {
    fn extract(
        &self,
        intent: Intent,
        utterance: &NormalizedUtterance,
        context: &ExtractionContext,
    ) -> SlotMap {
        let schema = SlotSchema::for_intent(intent);
        let mut slots = SlotMap::for_schema(&schema);

        for spec in schema.slots() {
            let fill = self.extract_slot(spec, utterance, context);
            if !fill.is_empty() {
                debug!("{intent}: {} = {fill:?}", spec.name);
            }
            slots.set(spec.name, fill);
        }

        slots
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}
