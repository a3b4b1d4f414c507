use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::similarity::SimilarityMatrix;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    pub a: String,
    pub b: String,
    /// Similarity as a percentage, rounded to two decimals.
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairwiseTable {
    pub rows: Vec<PairScore>,
}

impl PairwiseTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairScore> {
        self.rows.iter()
    }

    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.a == a && row.b == b)
            .map(|row| row.score)
    }
}

/// Flattens the matrix row-major into `names.len()²` rows, self-pairs and
/// both orderings included.
pub fn tabulate(names: &[String], matrix: &SimilarityMatrix) -> Result<PairwiseTable> {
    let size = matrix.size();
    if names.len() != size {
        return Err(SimError::ShapeMismatch {
            names: names.len(),
            size,
        });
    }
    let mut rows = Vec::with_capacity(size * size);
    for (i, a) in names.iter().enumerate() {
        for (j, b) in names.iter().enumerate() {
            let value = matrix.get(i, j).unwrap_or_default();
            rows.push(PairScore {
                a: a.clone(),
                b: b.clone(),
                score: to_percent(value),
            });
        }
    }
    Ok(PairwiseTable { rows })
}

/// `value * 100`, rounded half away from zero to two decimals.
pub fn to_percent(value: f64) -> f64 {
    (value * 100.0 * 100.0).round() / 100.0
}
