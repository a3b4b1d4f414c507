use serde::Serialize;

use crate::error::{Result, SimError};
use crate::tfidf::{fit_transform, FeatureMatrix};

/// Square matrix of pairwise cosine similarities, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn from_features(features: &FeatureMatrix) -> Result<Self> {
        let rows = features.rows();
        let size = rows.len();
        if size == 0 {
            return Err(SimError::InsufficientCorpus);
        }
        let norms: Vec<f64> = rows
            .iter()
            .map(|row| row.iter().map(|w| w * w).sum::<f64>().sqrt())
            .collect();
        let mut values = vec![0.0; size * size];
        for i in 0..size {
            if norms[i] == 0.0 {
                continue;
            }
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                if norms[j] == 0.0 {
                    continue;
                }
                let score = cosine(&rows[i], &rows[j], norms[i], norms[j]);
                values[i * size + j] = score;
                values[j * size + i] = score;
            }
        }
        Ok(Self { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.size && j < self.size {
            Some(self.values[i * self.size + j])
        } else {
            None
        }
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.size {
            Some(&self.values[i * self.size..(i + 1) * self.size])
        } else {
            None
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.size).map(<[f64]>::to_vec).collect()
    }
}

/// Vectorizes the processed texts and returns their pairwise similarities.
pub fn compute<S: AsRef<str>>(processed: &[S]) -> Result<SimilarityMatrix> {
    let features = fit_transform(processed)?;
    SimilarityMatrix::from_features(&features)
}

fn cosine(a: &[f64], b: &[f64], norm_a: f64, norm_b: f64) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_documents_score_one() {
        let m = compute(&["kucing makan ikan", "kucing makan ikan"]).unwrap();
        assert_eq!(m.size(), 2);
        assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.get(0, 0), Some(1.0));
    }

    #[test]
    fn disjoint_documents_score_zero() {
        let m = compute(&["kucing makan", "hujan deras"]).unwrap();
        assert_eq!(m.get(0, 1), Some(0.0));
        assert_eq!(m.get(1, 0), Some(0.0));
    }

    #[test]
    fn partial_overlap_is_between_bounds() {
        let m = compute(&["kucing makan ikan", "kucing makan nasi"]).unwrap();
        let s = m.get(0, 1).unwrap();
        assert!(s > 0.0 && s < 1.0);
        assert_eq!(m.get(0, 1), m.get(1, 0));
    }

    #[test]
    fn zero_vector_is_zero_everywhere() {
        let m = compute(&["kucing makan", "", "kucing"]).unwrap();
        assert_eq!(m.row(1).unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(m.get(0, 1), Some(0.0));
        assert_eq!(m.get(2, 2), Some(1.0));
    }

    #[test]
    fn out_of_range_lookups() {
        let m = compute(&["satu dua"]).unwrap();
        assert_eq!(m.get(0, 1), None);
        assert!(m.row(1).is_none());
        assert_eq!(m.to_rows(), vec![vec![1.0]]);
    }

    #[test]
    fn empty_input_is_insufficient() {
        let docs: Vec<String> = Vec::new();
        assert!(matches!(compute(&docs), Err(SimError::InsufficientCorpus)));
    }
}
