use std::path::PathBuf;

use thiserror::Error;

use crate::file_type::FileType;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),
    #[error("no {file_type} files in {directory:?}")]
    EmptyCorpus {
        directory: PathBuf,
        file_type: FileType,
    },
    #[error("failed to extract {path:?}: {reason}")]
    Extraction { path: PathBuf, reason: String },
    #[error("corpus needs at least one document")]
    InsufficientCorpus,
    #[error("{names} file names for a {size}x{size} similarity matrix")]
    ShapeMismatch { names: usize, size: usize },
    #[error("{0} support not enabled")]
    FormatDisabled(FileType),
    #[error("unknown file type: {0}")]
    UnknownFileType(String),
    #[error("unknown palette: {0}")]
    UnknownPalette(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the "directory missing or holds nothing to compare" failures
    /// that are reported before any document is opened.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::DirectoryNotFound(_) | Self::EmptyCorpus { .. })
    }
}
