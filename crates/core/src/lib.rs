mod corpus;
mod error;
mod extract;
mod file_type;
pub mod heatmap;
mod pipeline;
mod similarity;
pub mod stemmer;
mod tabulate;
mod tfidf;

pub use corpus::{list_files, load, Corpus, Document};
pub use error::{Result, SimError};
pub use extract::{extract, extract_pdf, extract_text, extract_word};
pub use file_type::FileType;
pub use heatmap::{render_svg, Palette};
pub use pipeline::{run, SimilarityReport, SimilarityRequest};
pub use similarity::{compute, SimilarityMatrix};
pub use stemmer::normalize;
pub use tabulate::{tabulate, to_percent, PairScore, PairwiseTable};
pub use tfidf::{fit_transform, tokenize, FeatureMatrix};
