use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, SimError};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("regex"));

/// Dense TF-IDF weights, one L2-normalized row per document and one column
/// per vocabulary term. Columns follow the sorted vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn n_documents(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, doc: usize) -> Option<&[f64]> {
        self.rows.get(doc).map(Vec::as_slice)
    }

    pub fn is_zero_row(&self, doc: usize) -> bool {
        self.row(doc)
            .map(|row| row.iter().all(|w| *w == 0.0))
            .unwrap_or(true)
    }

    /// Highest-weighted terms of one document, ties broken alphabetically.
    pub fn top_terms(&self, doc: usize, k: usize) -> Vec<(String, f64)> {
        let Some(row) = self.row(doc) else {
            return Vec::new();
        };
        let mut weighted: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        weighted
            .into_iter()
            .take(k)
            .map(|(col, w)| (self.vocabulary[col].clone(), w))
            .collect()
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Fits the vocabulary and smoothed IDF on `documents` and returns their
/// weights: `tf * (ln((1 + n) / (1 + df)) + 1)`, L2-normalized per row.
pub fn fit_transform<S: AsRef<str>>(documents: &[S]) -> Result<FeatureMatrix> {
    if documents.is_empty() {
        return Err(SimError::InsufficientCorpus);
    }
    let counts: Vec<BTreeMap<String, usize>> = documents
        .iter()
        .map(|doc| {
            let mut tf = BTreeMap::new();
            for token in tokenize(doc.as_ref()) {
                *tf.entry(token).or_insert(0) += 1;
            }
            tf
        })
        .collect();

    let vocabulary: Vec<String> = counts
        .iter()
        .flat_map(|tf| tf.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(idx, term)| (term.as_str(), idx))
        .collect();

    let mut df = vec![0usize; vocabulary.len()];
    for tf in &counts {
        for term in tf.keys() {
            df[columns[term.as_str()]] += 1;
        }
    }
    let n = documents.len() as f64;
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    let mut rows = Vec::with_capacity(counts.len());
    for (doc, tf) in counts.iter().enumerate() {
        let mut row = vec![0.0; vocabulary.len()];
        for (term, &count) in tf {
            let col = columns[term.as_str()];
            row[col] = count as f64 * idf[col];
        }
        let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|w| *w /= norm);
        } else {
            warn!(doc, "document has no terms; its feature vector is all zeros");
        }
        rows.push(row);
    }

    Ok(FeatureMatrix {
        vocabulary,
        idf,
        rows,
    })
}
