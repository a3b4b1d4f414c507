use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    #[default]
    Text,
    Word,
    Pdf,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Text, FileType::Word, FileType::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            FileType::Text => ".txt",
            FileType::Word => ".docx",
            FileType::Pdf => ".pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileType::Text => "text",
            FileType::Word => "word",
            FileType::Pdf => "pdf",
        }
    }

    /// Case-sensitive suffix match on the file name, same as a plain
    /// `endswith` check.
    pub fn matches(self, file_name: &str) -> bool {
        file_name.ends_with(self.extension())
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FileType {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "word" | "docx" => Ok(Self::Word),
            "pdf" => Ok(Self::Pdf),
            other => Err(SimError::UnknownFileType(other.to_string())),
        }
    }
}
