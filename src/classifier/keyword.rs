//! Keyword-based intent classifier.

use serde::{Deserialize, Serialize};

use crate::analysis::NormalizedUtterance;
use crate::error::Result;
use crate::intent::Intent;

use super::{IntentClassifier, IntentScore};

const RULESET_VERSION: &str = "keyword-3";

/// A weighted single- or multi-word cue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub phrase: String,
    pub weight: f32,
}

type CueTable = &'static [(Intent, &'static [(&'static str, f32)])];

const DEFAULT_CUES: CueTable = &[
    (
        Intent::LibraryHours,
        &[
            ("library", 0.6),
            ("open", 0.6),
            ("opening", 0.6),
            ("hours", 0.8),
            ("timings", 0.8),
            ("timing", 0.8),
            ("close", 0.6),
            ("closing", 0.6),
            ("closes", 0.6),
            ("when", 0.2),
        ],
    ),
    (
        Intent::ExamSchedule,
        &[
            ("exam", 1.0),
            ("exams", 1.0),
            ("examination", 1.0),
            ("midterm", 1.0),
            ("midterms", 1.0),
            ("finals", 0.8),
            ("schedule", 0.3),
            ("timetable", 0.3),
            ("when", 0.2),
        ],
    ),
    (
        Intent::ClassSchedule,
        &[
            ("class", 1.0),
            ("classes", 1.0),
            ("lecture", 0.9),
            ("lectures", 0.9),
            ("timetable", 0.6),
            ("schedule", 0.5),
            ("department", 0.4),
            ("dept", 0.4),
            ("course", 0.3),
        ],
    ),
    (
        Intent::FacilityLocation,
        &[
            ("where", 0.8),
            ("located", 0.9),
            ("location", 0.9),
            ("directions", 0.8),
            ("how do i get to", 1.0),
            ("how to get to", 1.0),
            ("way to", 0.5),
        ],
    ),
    (
        Intent::FacilityBooking,
        &[
            ("book", 0.6),
            ("book a", 0.5),
            ("book the", 0.5),
            ("booking", 0.9),
            ("reserve", 0.9),
            ("reservation", 0.9),
            ("slot", 0.8),
            ("slots", 0.8),
        ],
    ),
    (
        Intent::DiningMenu,
        &[
            ("menu", 1.0),
            ("food", 0.8),
            ("eat", 0.8),
            ("dining", 0.6),
            ("canteen", 0.6),
            ("mess", 0.6),
            ("cafeteria", 0.6),
            ("breakfast", 0.7),
            ("lunch", 0.7),
            ("dinner", 0.7),
            ("serving", 0.5),
            ("thali", 0.6),
        ],
    ),
    (
        Intent::BookSearch,
        &[
            ("book", 0.5),
            ("books", 0.8),
            ("novel", 0.8),
            ("textbook", 0.9),
            ("borrow", 0.8),
            ("titled", 1.0),
            ("author", 0.8),
            ("catalogue", 0.9),
            ("catalog", 0.9),
            ("copy", 0.5),
            ("search", 0.4),
            ("find", 0.3),
        ],
    ),
    (
        Intent::AdminProcedure,
        &[
            ("apply", 0.7),
            ("application", 0.7),
            ("leave", 0.6),
            ("admission", 0.8),
            ("admissions", 0.8),
            ("procedure", 0.9),
            ("process", 0.6),
            ("form", 0.5),
            ("registration", 0.9),
            ("register", 0.8),
            ("deadline", 0.5),
            ("transcript", 0.9),
            ("fee", 0.7),
            ("fees", 0.7),
            ("how to", 0.2),
            ("how do i", 0.2),
        ],
    ),
];

/// Keyword-based intent classifier.
///
/// Each intent has weighted cues. The raw score `s` of an intent is the sum
/// of the weights of its cues present in the utterance (each cue counts once).
/// Confidence is `(1 - e^-s) * sqrt(s / Σs)`: it grows with evidence and
/// shrinks when other intents match too.
#[derive(Clone, Debug)]
pub struct KeywordIntentClassifier {
    cues: Vec<(Intent, Vec<Cue>)>,
}

impl KeywordIntentClassifier {
    /// Create a classifier with the built-in campus cues.
    pub fn new() -> Self {
        let cues = DEFAULT_CUES
            .iter()
            .map(|(intent, cues)| {
                let cues = cues
                    .iter()
                    .map(|(phrase, weight)| Cue {
                        phrase: phrase.to_string(),
                        weight: *weight,
                    })
                    .collect();
                (*intent, cues)
            })
            .collect();
        Self { cues }
    }

    /// Create a classifier from custom cues.
    pub fn with_cues(cues: Vec<(Intent, Vec<Cue>)>) -> Self {
        Self { cues }
    }

    pub fn cues(&self) -> &[(Intent, Vec<Cue>)] {
        &self.cues
    }
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn predict(&self, utterance: &NormalizedUtterance) -> Result<Vec<IntentScore>> {
        let raw: Vec<(Intent, f32)> = self
            .cues
            .iter()
            .map(|(intent, cues)| {
                let score = cues
                    .iter()
                    .filter(|cue| utterance.contains_phrase(&cue.phrase))
                    .map(|cue| cue.weight)
                    .sum();
                (*intent, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        let total: f64 = raw.iter().map(|(_, s)| f64::from(*s)).sum();
        if total <= 0.0 {
            return Ok(Vec::new());
        }

        Ok(raw
            .into_iter()
            .map(|(intent, score)| {
                let s = f64::from(score);
                let confidence = (1.0 - (-s).exp()) * (s / total).sqrt();
                IntentScore {
                    intent,
                    score,
                    confidence: confidence as f32,
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }

    fn version(&self) -> &str {
        RULESET_VERSION
    }
}
