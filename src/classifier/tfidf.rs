//! TF-IDF features over normalized utterances.
//!
//! An utterance contributes its content terms (stop words removed) and every
//! adjacent pair of content terms, so "dining hall" counts as a feature of its
//! own next to "dining" and "hall". Vectors are sparse and L2-normalised:
//! utterances carry a handful of features against a vocabulary of hundreds.

use std::collections::HashSet;

use ahash::AHashMap;

use crate::analysis::NormalizedUtterance;
use crate::analysis::token_filter::stop::StopFilter;

/// Sparse feature vector: `(term index, weight)` sorted by index.
pub type TermVector = Vec<(usize, f64)>;

/// Fits IDF weights on training utterances and turns utterances into
/// [`TermVector`]s.
#[derive(Clone, Debug)]
pub struct TfIdfVectorizer {
    vocabulary: AHashMap<String, usize>,
    idf: Vec<f64>,
    n_documents: usize,
    stop_words: StopFilter,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self::with_stop_words(StopFilter::new())
    }

    pub fn with_stop_words(stop_words: StopFilter) -> Self {
        Self {
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            stop_words,
        }
    }

    /// Fit the vocabulary and IDF weights.
    ///
    /// Term indices follow first appearance, so fitting the same utterances
    /// always yields the same vectors.
    pub fn fit(&mut self, documents: &[NormalizedUtterance]) {
        let mut vocabulary = AHashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for doc in documents {
            let mut seen = HashSet::new();
            for feature in self.features(doc) {
                let next = vocabulary.len();
                let idx = *vocabulary.entry(feature).or_insert(next);
                if idx == document_frequency.len() {
                    document_frequency.push(0);
                }
                if seen.insert(idx) {
                    document_frequency[idx] += 1;
                }
            }
        }

        // ln((N + 1) / (df + 1)) + 1
        let n = documents.len() as f64;
        self.idf = document_frequency
            .iter()
            .map(|&df| ((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0)
            .collect();
        self.vocabulary = vocabulary;
        self.n_documents = documents.len();
    }

    /// Weight an utterance's known features. Unknown features are ignored;
    /// an utterance with none yields an empty vector.
    pub fn transform(&self, utterance: &NormalizedUtterance) -> TermVector {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for feature in self.features(utterance) {
            if let Some(&idx) = self.vocabulary.get(&feature) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: TermVector = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        vector.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }

    /// Content terms followed by adjacent content-term pairs.
    fn features(&self, utterance: &NormalizedUtterance) -> Vec<String> {
        let terms: Vec<&str> = utterance
            .tokens()
            .iter()
            .map(String::as_str)
            .filter(|token| !self.stop_words.is_stop_word(token))
            .collect();

        let pairs = terms.windows(2).map(|pair| pair.join(" "));
        terms.iter().map(|term| term.to_string()).chain(pairs).collect()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosine similarity of two L2-normalised term vectors.
pub(crate) fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a.len() && j < b.len() {
        let ((ia, wa), (ib, wb)) = (a[i], b[j]);
        match ia.cmp(&ib) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += wa * wb;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}
