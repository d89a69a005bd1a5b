//! TF-IDF vectorization over a frozen vocabulary.
//!
//! `fit` builds the vocabulary and idf weights from training text once;
//! `transform` projects any text into that frozen space. Terms absent from
//! the vocabulary are ignored — the vocabulary never grows at inference
//! time. Fitting again produces a new, incompatible `FeatureSpace`:
//! classifiers trained against the old one must be retrained together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::features::stopwords::is_stop_word;

/// A single document row: `(feature index, weight)` pairs sorted by index.
pub type SparseVec = Vec<(usize, f64)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 2,
            max_df: 0.8,
            sublinear_tf: true,
        }
    }
}

/// Frozen vocabulary and weighting statistics. Fit once by the training
/// pipeline; inference holds a read-only shared copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    config: VectorizerConfig,
}

impl FeatureSpace {
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

/// Lowercase alphanumeric runs (underscore included), length >= 2.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            for lower in ch.to_lowercase() {
                current.push(lower);
            }
        } else if !current.is_empty() {
            if current.chars().count() >= 2 {
                tokens.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.chars().count() >= 2 {
        tokens.push(current);
    }

    tokens
}

/// Term counts for one document: stop words removed, then word n-grams
/// formed over the remaining adjacent tokens.
fn term_counts(text: &str, lo: usize, hi: usize) -> HashMap<String, u32> {
    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut counts = HashMap::new();
    for n in lo..=hi {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            let gram = window.join(" ");
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// Fits a feature space: document-frequency filtering, truncation to the
/// highest-frequency `max_features` terms, smoothed idf weights.
pub fn fit(texts: &[String], config: VectorizerConfig) -> FeatureSpace {
    let n_docs = texts.len();
    let mut doc_freq: HashMap<String, usize> = HashMap::new();
    let mut corpus_freq: HashMap<String, u64> = HashMap::new();

    for text in texts {
        let counts = term_counts(text, config.ngram_min, config.ngram_max);
        for (term, count) in counts {
            *corpus_freq.entry(term.clone()).or_insert(0) += u64::from(count);
            *doc_freq.entry(term).or_insert(0) += 1;
        }
    }

    let max_doc_count = (config.max_df * n_docs as f64).floor() as usize;
    let mut candidates: Vec<(String, usize)> = doc_freq
        .into_iter()
        .filter(|&(_, df)| df >= config.min_df && df <= max_doc_count)
        .collect();

    // Keep the highest corpus-frequency terms; ties break alphabetically so
    // the vocabulary is deterministic.
    candidates.sort_by(|a, b| {
        corpus_freq[&b.0]
            .cmp(&corpus_freq[&a.0])
            .then_with(|| a.0.cmp(&b.0))
    });
    candidates.truncate(config.max_features);

    // Index assignment follows sorted term order.
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut vocabulary = HashMap::with_capacity(candidates.len());
    let mut idf = Vec::with_capacity(candidates.len());
    for (index, (term, df)) in candidates.into_iter().enumerate() {
        vocabulary.insert(term, index);
        idf.push(((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0);
    }

    FeatureSpace {
        vocabulary,
        idf,
        config,
    }
}

/// Projects text into the frozen space: sublinear tf, idf weighting,
/// L2-normalized. Pure and deterministic for a given `FeatureSpace`.
pub fn transform(text: &str, space: &FeatureSpace) -> SparseVec {
    let config = &space.config;
    let counts = term_counts(text, config.ngram_min, config.ngram_max);

    let mut row: SparseVec = counts
        .into_iter()
        .filter_map(|(term, count)| {
            space.vocabulary.get(&term).map(|&index| {
                let tf = if config.sublinear_tf {
                    1.0 + f64::from(count).ln()
                } else {
                    f64::from(count)
                };
                (index, tf * space.idf[index])
            })
        })
        .collect();

    let norm = row.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for entry in &mut row {
            entry.1 /= norm;
        }
    }
    row.sort_unstable_by_key(|&(index, _)| index);
    row
}
