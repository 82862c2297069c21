//! Intent classification.
//!
//! Classification is split in two layers:
//!
//! - [`IntentClassifier`] backends score every intent for an utterance
//!   ([`KeywordIntentClassifier`], [`TfIdfIntentClassifier`]).
//! - [`GatedClassifier`] picks one intent from those scores, breaks ties
//!   deterministically and applies the confidence threshold.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use concierge::analysis::Normalizer;
//! use concierge::classifier::{GatedClassifier, KeywordIntentClassifier};
//! use concierge::intent::Intent;
//!
//! let classifier = GatedClassifier::new(Arc::new(KeywordIntentClassifier::new()), 0.5);
//! let utterance = Normalizer::new().normalize("When is the library open?");
//!
//! let classification = classifier.classify(&utterance);
//! assert_eq!(classification.intent, Intent::LibraryHours);
//! assert!(classification.confidence >= 0.5);
//! ```

use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::analysis::NormalizedUtterance;
use crate::config::ClassifierKind;
use crate::error::Result;
use crate::intent::Intent;
use crate::slot::SlotSchema;

mod keyword;
mod statistical;
mod tfidf;
mod training;

pub use keyword::{Cue, KeywordIntentClassifier};
pub use statistical::TfIdfIntentClassifier;
pub use tfidf::{TermVector, TfIdfVectorizer};
pub use training::{IntentSample, builtin_samples, load_training_data};

/// Scores closer than this are treated as equal.
const TIE_EPSILON: f32 = 1e-6;

/// Intent classifier trait.
///
/// Implementations score intents for a normalized utterance. Scores for
/// intents that did not match at all may be omitted.
pub trait IntentClassifier: Send + Sync {
    /// Score candidate intents for the utterance.
    fn predict(&self, utterance: &NormalizedUtterance) -> Result<Vec<IntentScore>>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;

    /// Ruleset or model version. Identical tokens and version give identical output.
    fn version(&self) -> &str;
}

/// One scored candidate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IntentScore {
    pub intent: Intent,
    /// Backend-specific raw score.
    pub score: f32,
    /// Normalized confidence in [0, 1].
    pub confidence: f32,
}

/// The outcome of gated classification.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Routed intent; `Unknown` when below threshold.
    pub intent: Intent,
    pub confidence: f32,
    /// Top prediction before thresholding.
    pub raw_intent: Intent,
    /// All candidates, best first.
    pub scores: Vec<IntentScore>,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            raw_intent: Intent::Unknown,
            scores: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.intent.is_unknown()
    }
}

/// Threshold-gated, tie-breaking front of a classifier backend.
#[derive(Clone)]
pub struct GatedClassifier {
    backend: Arc<dyn IntentClassifier>,
    threshold: f32,
}

impl std::fmt::Debug for GatedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatedClassifier")
            .field("backend", &self.backend.name())
            .field("version", &self.backend.version())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl GatedClassifier {
    pub fn new(backend: Arc<dyn IntentClassifier>, threshold: f32) -> Self {
        Self { backend, threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn backend(&self) -> &dyn IntentClassifier {
        self.backend.as_ref()
    }

    /// Classify an utterance. Never fails.
    ///
    /// Empty input and backend errors yield `Unknown` with confidence 0.
    pub fn classify(&self, utterance: &NormalizedUtterance) -> Classification {
        if utterance.is_empty() {
            return Classification::unknown();
        }

        let mut scores = match self.backend.predict(utterance) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("classifier {} failed: {e}", self.backend.name());
                return Classification::unknown();
            }
        };

        scores.retain(|s| !s.intent.is_unknown() && s.confidence.is_finite() && s.confidence > 0.0);
        for score in &mut scores {
            score.confidence = score.confidence.clamp(0.0, 1.0);
        }
        scores.sort_by(Self::rank);

        let Some(best) = scores.first().copied() else {
            return Classification::unknown();
        };

        let intent = if best.confidence >= self.threshold {
            best.intent
        } else {
            Intent::Unknown
        };
        debug!(
            "classified '{}' as {} ({:.3}, raw {})",
            utterance.text(),
            intent,
            best.confidence,
            best.intent
        );

        Classification {
            intent,
            confidence: best.confidence,
            raw_intent: best.intent,
            scores,
        }
    }

    /// Higher confidence first; near-equal confidence prefers fewer required
    /// slots, then taxonomy order.
    fn rank(a: &IntentScore, b: &IntentScore) -> std::cmp::Ordering {
        if (a.confidence - b.confidence).abs() > TIE_EPSILON {
            return b.confidence.total_cmp(&a.confidence);
        }
        let required = |intent: Intent| SlotSchema::for_intent(intent).required_count();
        required(a.intent)
            .cmp(&required(b.intent))
            .then(a.intent.cmp(&b.intent))
    }
}

/// Build a classifier backend.
///
/// The statistical backend trains on `training` when given, else on the
/// built-in samples.
pub fn build_classifier(
    kind: ClassifierKind,
    training: Option<&Path>,
) -> Result<Arc<dyn IntentClassifier>> {
    match kind {
        ClassifierKind::Keyword => Ok(Arc::new(KeywordIntentClassifier::new())),
        ClassifierKind::Tfidf => {
            let samples = match training {
                Some(path) => load_training_data(path)?,
                None => builtin_samples()?,
            };
            Ok(Arc::new(TfIdfIntentClassifier::new(samples)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConciergeError;

    struct FixedClassifier(Vec<IntentScore>);

    impl IntentClassifier for FixedClassifier {
        fn predict(&self, _utterance: &NormalizedUtterance) -> Result<Vec<IntentScore>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn version(&self) -> &str {
            "1"
        }
    }

    struct FailingClassifier;

    impl IntentClassifier for FailingClassifier {
        fn predict(&self, _utterance: &NormalizedUtterance) -> Result<Vec<IntentScore>> {
            Err(ConciergeError::classifier("model missing"))
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn version(&self) -> &str {
            "1"
        }
    }

    fn score(intent: Intent, confidence: f32) -> IntentScore {
        IntentScore {
            intent,
            score: confidence,
            confidence,
        }
    }

    fn utterance(text: &str) -> NormalizedUtterance {
        NormalizedUtterance::from_tokens(text.split_whitespace())
    }

    #[test]
    fn test_tie_prefers_fewer_required_slots() {
        // FACILITY_BOOKING requires two slots, LIBRARY_HOURS none.
        let backend = FixedClassifier(vec![
            score(Intent::FacilityBooking, 0.7),
            score(Intent::LibraryHours, 0.7),
        ]);
        let classifier = GatedClassifier::new(Arc::new(backend), 0.5);
        assert_eq!(classifier.classify(&utterance("x")).intent, Intent::LibraryHours);
    }

    #[test]
    fn test_tie_then_taxonomy_order() {
        // Both require one slot.
        let backend = FixedClassifier(vec![
            score(Intent::BookSearch, 0.6),
            score(Intent::ExamSchedule, 0.6),
        ]);
        let classifier = GatedClassifier::new(Arc::new(backend), 0.5);
        assert_eq!(classifier.classify(&utterance("x")).intent, Intent::ExamSchedule);
    }

    #[test]
    fn test_below_threshold_is_unknown() {
        let backend = FixedClassifier(vec![score(Intent::DiningMenu, 0.4)]);
        let classifier = GatedClassifier::new(Arc::new(backend), 0.5);
        let classification = classifier.classify(&utterance("x"));
        assert_eq!(classification.intent, Intent::Unknown);
        assert_eq!(classification.raw_intent, Intent::DiningMenu);
        assert!((classification.confidence - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_empty_and_failure_degrade_to_unknown() {
        let classifier = GatedClassifier::new(Arc::new(FailingClassifier), 0.5);
        assert_eq!(classifier.classify(&utterance("library")), Classification::unknown());

        let classifier = GatedClassifier::new(Arc::new(KeywordIntentClassifier::new()), 0.5);
        assert_eq!(
            classifier.classify(&NormalizedUtterance::default()),
            Classification::unknown()
        );
    }

    #[test]
    fn test_deterministic() {
        let classifier = GatedClassifier::new(Arc::new(KeywordIntentClassifier::new()), 0.5);
        let tokens = utterance("book the gym for the library");
        assert_eq!(classifier.classify(&tokens), classifier.classify(&tokens));
    }

    #[test]
    fn test_build_classifier() {
        let keyword = build_classifier(ClassifierKind::Keyword, None).unwrap();
        assert_eq!(keyword.name(), "keyword");
        let tfidf = build_classifier(ClassifierKind::Tfidf, None).unwrap();
        assert_eq!(tfidf.name(), "tfidf");
    }
}
