// Class-based TF-IDF over cluster documents.
//
// Each cluster's messages are concatenated into a single document, and
// TF-IDF is computed across that small corpus of cluster documents. Words
// that appear in most clusters get downweighted; words distinctive to one
// cluster get boosted — exactly what we want for picking a label that
// separates one conversation topic from the others.
//
// Tokenization is deliberately simple: lowercase, word-regex split,
// baseline English stopword removal, then unigrams and bigrams over the
// surviving sequence.

use std::collections::{HashMap, HashSet};

use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use thiserror::Error;
use tracing::debug;

/// Fraction of cluster documents a term may appear in before it is
/// considered too generic to discriminate and dropped entirely.
const MAX_DOC_FREQUENCY: f64 = 0.5;

/// The concatenated text of one non-empty cluster, carrying its origin.
///
/// Cluster id and size travel with the text so dropping empty clusters
/// can never misalign sizes against documents.
#[derive(Debug, Clone)]
pub struct ClusterDocument {
    pub cluster_id: usize,
    pub size: usize,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TermModelError {
    /// Every candidate term was removed by stopword or document-frequency
    /// filtering — clustering succeeded but no topics can be extracted.
    #[error("vocabulary is empty after stopword and document-frequency filtering")]
    DegenerateVocabulary,
}

/// TF-IDF weights for every (cluster document, term) pair.
#[derive(Debug)]
pub struct TermMatrix {
    vocabulary: Vec<String>,
    /// One dense weight row per cluster document, aligned with `vocabulary`
    rows: Vec<Vec<f64>>,
}

impl TermMatrix {
    /// Build the term matrix over a corpus of cluster documents.
    ///
    /// Weighting follows the standard smoothed form: raw term count times
    /// `ln((1 + docs) / (1 + df)) + 1`, with each row L2-normalized.
    pub fn build(docs: &[ClusterDocument]) -> Result<Self, TermModelError> {
        let stopwords: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        let word_re = Regex::new(r"\b\w\w+\b").expect("valid token pattern");

        let doc_terms: Vec<HashMap<String, f64>> = docs
            .iter()
            .map(|d| count_terms(&d.text, &word_re, &stopwords))
            .collect();

        let n_docs = docs.len();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &doc_terms {
            for term in terms.keys() {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        // Terms in more than half the cluster documents are too generic
        // to tell clusters apart.
        let mut vocabulary: Vec<String> = doc_freq
            .iter()
            .filter(|(_, &df)| df as f64 <= MAX_DOC_FREQUENCY * n_docs as f64)
            .map(|(term, _)| term.to_string())
            .collect();
        vocabulary.sort_unstable();

        if vocabulary.is_empty() {
            return Err(TermModelError::DegenerateVocabulary);
        }

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let rows = doc_terms
            .iter()
            .map(|terms| {
                let mut row = vec![0.0; vocabulary.len()];
                for (term, &tf) in terms {
                    if let Some(&col) = index.get(term.as_str()) {
                        let df = doc_freq[term.as_str()] as f64;
                        let idf = ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0;
                        row[col] = tf * idf;
                    }
                }
                let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for w in &mut row {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        debug!(
            documents = n_docs,
            vocabulary = vocabulary.len(),
            "Built class TF-IDF matrix"
        );

        Ok(Self { vocabulary, rows })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Terms of one cluster document, highest weight first.
    ///
    /// The sort is stable, so equal weights keep vocabulary order — the
    /// tie-break the label selector depends on.
    pub fn ranked_terms(&self, row: usize) -> Vec<&str> {
        let weights = &self.rows[row];
        let mut order: Vec<usize> = (0..self.vocabulary.len()).collect();
        order.sort_by(|&a, &b| {
            weights[b]
                .partial_cmp(&weights[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.into_iter().map(|i| self.vocabulary[i].as_str()).collect()
    }

    pub fn weight(&self, row: usize, term: &str) -> f64 {
        self.vocabulary
            .iter()
            .position(|t| t == term)
            .map_or(0.0, |col| self.rows[row][col])
    }
}

/// Tokenize one document into unigram and bigram counts.
///
/// Bigrams are formed over the stopword-filtered token sequence, so
/// "piece of cake" yields the bigram "piece cake".
fn count_terms(
    text: &str,
    word_re: &Regex,
    stopwords: &HashSet<String>,
) -> HashMap<String, f64> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = word_re
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !stopwords.contains(*t))
        .collect();

    let mut counts = HashMap::new();
    for token in &tokens {
        *counts.entry(token.to_string()).or_insert(0.0) += 1.0;
    }
    for pair in tokens.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0.0) += 1.0;
    }
    counts
}
