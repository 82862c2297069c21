//! Statistical intent classifier using TF-IDF prototypes.

use std::collections::BTreeMap;

use crate::analysis::{NormalizedUtterance, Normalizer};
use crate::error::{ConciergeError, Result};
use crate::intent::Intent;

use super::tfidf::{TermVector, TfIdfVectorizer, cosine_similarity};
use super::training::IntentSample;
use super::{IntentClassifier, IntentScore};

/// TF-IDF nearest-prototype classifier.
///
/// Every training sample becomes a prototype vector of its intent. The
/// confidence of an intent is the best cosine similarity between the
/// utterance and any of its prototypes.
#[derive(Debug)]
pub struct TfIdfIntentClassifier {
    vectorizer: TfIdfVectorizer,
    /// Intent -> prototype feature vectors.
    prototypes: BTreeMap<Intent, Vec<TermVector>>,
    version: String,
}

impl TfIdfIntentClassifier {
    /// Train a classifier from labelled samples.
    pub fn new(samples: Vec<IntentSample>) -> Result<Self> {
        let samples: Vec<IntentSample> = samples
            .into_iter()
            .filter(|s| !s.intent.is_unknown())
            .collect();
        if samples.is_empty() {
            return Err(ConciergeError::classifier("Training samples cannot be empty"));
        }

        // Samples go through the same normalization as live utterances.
        let normalizer = Normalizer::new();
        let documents: Vec<NormalizedUtterance> = samples
            .iter()
            .map(|sample| normalizer.normalize(&sample.query))
            .collect();
        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&documents);

        let mut prototypes: BTreeMap<Intent, Vec<TermVector>> = BTreeMap::new();
        for (sample, document) in samples.iter().zip(&documents) {
            let features = vectorizer.transform(document);
            if features.is_empty() {
                continue;
            }
            prototypes.entry(sample.intent).or_default().push(features);
        }
        if prototypes.is_empty() {
            return Err(ConciergeError::classifier(
                "Training samples carry no content terms",
            ));
        }

        let version = format!("tfidf-{}x{}", samples.len(), vectorizer.vocabulary_size());
        Ok(Self {
            vectorizer,
            prototypes,
            version,
        })
    }

    pub fn intents(&self) -> impl Iterator<Item = &Intent> {
        self.prototypes.keys()
    }
}

impl IntentClassifier for TfIdfIntentClassifier {
    fn predict(&self, utterance: &NormalizedUtterance) -> Result<Vec<IntentScore>> {
        let features = self.vectorizer.transform(utterance);

        Ok(self
            .prototypes
            .iter()
            .map(|(intent, prototypes)| {
                let best = prototypes
                    .iter()
                    .map(|prototype| cosine_similarity(&features, prototype))
                    .fold(0.0f64, f64::max);
                IntentScore {
                    intent: *intent,
                    score: best as f32,
                    confidence: best as f32,
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "tfidf"
    }

    fn version(&self) -> &str {
        &self.version
    }
}
