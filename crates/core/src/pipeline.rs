use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::corpus;
use crate::error::Result;
use crate::file_type::FileType;
use crate::similarity::SimilarityMatrix;
use crate::stemmer::normalize;
use crate::tabulate::{tabulate, PairwiseTable};
use crate::tfidf::{fit_transform, FeatureMatrix};

#[derive(Debug, Clone)]
pub struct SimilarityRequest {
    pub directory: PathBuf,
    pub file_type: FileType,
    pub stem: bool,
}

impl SimilarityRequest {
    pub fn new(directory: impl Into<PathBuf>, file_type: FileType) -> Self {
        Self {
            directory: directory.into(),
            file_type,
            stem: true,
        }
    }

    pub fn stem(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarityReport {
    pub files: Vec<String>,
    #[serde(skip)]
    pub features: FeatureMatrix,
    pub matrix: SimilarityMatrix,
    pub table: PairwiseTable,
}

impl SimilarityReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the whole comparison for one request: list, extract, normalize,
/// vectorize, compare and tabulate. Nothing is cached between calls.
pub fn run(request: &SimilarityRequest) -> Result<SimilarityReport> {
    let corpus = corpus::load(&request.directory, request.file_type)?;
    let processed: Vec<String> = corpus
        .documents()
        .iter()
        .map(|doc| normalize(&doc.raw_text, request.stem))
        .collect();
    let features = fit_transform(&processed)?;
    let matrix = SimilarityMatrix::from_features(&features)?;
    let files = corpus.file_names();
    let table = tabulate(&files, &matrix)?;
    info!(
        directory = %request.directory.display(),
        file_type = %request.file_type,
        stem = request.stem,
        documents = files.len(),
        vocabulary = features.n_features(),
        "similarity computed"
    );
    Ok(SimilarityReport {
        files,
        features,
        matrix,
        table,
    })
}
