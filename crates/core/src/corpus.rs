use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use walkdir::WalkDir;

use crate::error::{Result, SimError};
use crate::extract::extract;
use crate::file_type::FileType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub name: String,
    pub raw_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Corpus {
    directory: PathBuf,
    file_type: FileType,
    documents: Vec<Document>,
}

impl Corpus {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn file_names(&self) -> Vec<String> {
        self.documents.iter().map(|doc| doc.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Names of the files in `directory` carrying the extension of `file_type`,
/// in directory-listing order. Nothing is opened here, so a missing or empty
/// directory is rejected before any extraction starts.
pub fn list_files(directory: &Path, file_type: FileType) -> Result<Vec<String>> {
    if !directory.is_dir() {
        return Err(SimError::DirectoryNotFound(directory.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.matches(&name) {
            files.push(name);
        }
    }
    if files.is_empty() {
        return Err(SimError::EmptyCorpus {
            directory: directory.to_path_buf(),
            file_type,
        });
    }
    Ok(files)
}

pub fn load(directory: &Path, file_type: FileType) -> Result<Corpus> {
    let files = list_files(directory, file_type)?;
    let mut documents = Vec::with_capacity(files.len());
    for name in files {
        let raw_text = extract(&directory.join(&name), file_type)?;
        documents.push(Document { name, raw_text });
    }
    info!(
        directory = %directory.display(),
        %file_type,
        documents = documents.len(),
        "corpus loaded"
    );
    Ok(Corpus {
        directory: directory.to_path_buf(),
        file_type,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("tidak-ada");
        let err = load(&missing, FileType::Text).unwrap_err();
        assert!(matches!(err, SimError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            list_files(&file, FileType::Text),
            Err(SimError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn directory_without_matches_is_empty_corpus() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("catatan.md"), "# judul").unwrap();
        fs::write(dir.path().join("a.txt"), "teks").unwrap();
        let err = list_files(dir.path(), FileType::Pdf).unwrap_err();
        assert!(err.is_precondition());
        assert!(matches!(err, SimError::EmptyCorpus { file_type: FileType::Pdf, .. }));
    }

    #[test]
    fn filters_by_extension_and_skips_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "satu").unwrap();
        fs::write(dir.path().join("b.txt"), "dua").unwrap();
        fs::write(dir.path().join("c.docx"), "bukan teks").unwrap();
        fs::create_dir(dir.path().join("arsip.txt")).unwrap();

        let mut files = list_files(dir.path(), FileType::Text).unwrap();
        files.sort();
        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn load_keeps_listing_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "kucing\nmakan").unwrap();
        fs::write(dir.path().join("b.txt"), "ikan").unwrap();

        let listed = list_files(dir.path(), FileType::Text).unwrap();
        let corpus = load(dir.path(), FileType::Text).unwrap();
        assert_eq!(corpus.file_names(), listed);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.file_type(), FileType::Text);
        let a = corpus
            .documents()
            .iter()
            .find(|doc| doc.name == "a.txt")
            .unwrap();
        assert_eq!(a.raw_text, "kucing makan");
    }

    #[test]
    fn extraction_failure_aborts_the_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "baik").unwrap();
        fs::write(dir.path().join("b.txt"), [0xffu8, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            load(dir.path(), FileType::Text),
            Err(SimError::Extraction { .. })
        ));
    }
}
