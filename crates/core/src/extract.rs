use std::fs;
use std::path::Path;

#[cfg(feature = "word")]
use docx_rs::{read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild};
use tracing::debug;

use crate::error::{Result, SimError};
use crate::file_type::FileType;

pub fn extract(path: &Path, file_type: FileType) -> Result<String> {
    let text = match file_type {
        FileType::Text => extract_text(path)?,
        FileType::Word => extract_word(path)?,
        FileType::Pdf => extract_pdf(path)?,
    };
    debug!(path = %path.display(), %file_type, chars = text.chars().count(), "extracted");
    Ok(text)
}

pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| SimError::extraction(path, e))?;
    let content = String::from_utf8(bytes).map_err(|e| SimError::extraction(path, e))?;
    Ok(content.replace("\r\n", " ").replace('\n', " "))
}

#[cfg(feature = "word")]
pub fn extract_word(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| SimError::extraction(path, e))?;
    let docx = read_docx(&bytes).map_err(|e| SimError::extraction(path, e))?;
    let paragraphs = docx.document.children.iter().filter_map(|child| match child {
        DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
        _ => None,
    });
    Ok(join_segments(paragraphs))
}

#[cfg(not(feature = "word"))]
pub fn extract_word(_path: &Path) -> Result<String> {
    Err(SimError::FormatDisabled(FileType::Word))
}

#[cfg(feature = "pdf")]
pub fn extract_pdf(path: &Path) -> Result<String> {
    let pages =
        pdf_extract::extract_text_by_pages(path).map_err(|e| SimError::extraction(path, e))?;
    Ok(join_segments(pages))
}

#[cfg(not(feature = "pdf"))]
pub fn extract_pdf(_path: &Path) -> Result<String> {
    Err(SimError::FormatDisabled(FileType::Pdf))
}

/// Trims every segment, turns its inner newlines into spaces and joins the
/// segments with one space. Empty segments are kept.
pub(crate) fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| segment.as_ref().trim().replace('\n', " "))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(feature = "word")]
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut buffer = String::new();
    for child in &paragraph.children {
        append_paragraph_child(child, &mut buffer);
    }
    buffer
}

#[cfg(feature = "word")]
fn append_paragraph_child(child: &ParagraphChild, buffer: &mut String) {
    match child {
        ParagraphChild::Run(run) => append_run(run, buffer),
        ParagraphChild::Insert(insert) => {
            for inner in &insert.children {
                if let InsertChild::Run(run) = inner {
                    append_run(run, buffer);
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                append_paragraph_child(inner, buffer);
            }
        }
        _ => {}
    }
}

#[cfg(feature = "word")]
fn append_run(run: &Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => buffer.push_str(&text.text),
            RunChild::Tab(_) => buffer.push('\t'),
            RunChild::Break(_) => buffer.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn text_newlines_become_spaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "kucing makan\nikan\r\ngoreng\n").unwrap();
        let text = extract(&path, FileType::Text).unwrap();
        assert_eq!(text, "kucing makan ikan goreng ");
    }

    #[test]
    fn text_keeps_case_and_punctuation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "Kucing, MAKAN ikan!").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "Kucing, MAKAN ikan!");
    }

    #[test]
    fn invalid_utf8_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x6b, 0xe9, 0xff, 0x0a]).unwrap();
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, SimError::Extraction { path: p, .. } if p == path));
    }

    #[test]
    fn missing_file_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let err = extract(&dir.path().join("gone.txt"), FileType::Text).unwrap_err();
        assert!(matches!(err, SimError::Extraction { .. }));
    }

    #[test]
    fn segments_are_trimmed_and_joined() {
        let joined = join_segments(["  satu\ndua  ", "", "tiga\n"]);
        assert_eq!(joined, "satu dua  tiga");
    }

    #[cfg(feature = "word")]
    #[test]
    fn word_paragraphs_in_order() {
        use docx_rs::{Docx, Paragraph, Run};

        let dir = tempdir().unwrap();
        let path = dir.path().join("surat.docx");
        let file = fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Kucing makan")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("ikan goreng")))
            .build()
            .pack(file)
            .unwrap();

        let text = extract(&path, FileType::Word).unwrap();
        assert_eq!(text, "Kucing makan ikan goreng");
    }

    #[cfg(feature = "word")]
    #[test]
    fn corrupt_word_file_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rusak.docx");
        fs::write(&path, "bukan dokumen word").unwrap();
        assert!(matches!(
            extract(&path, FileType::Word),
            Err(SimError::Extraction { .. })
        ));
    }

    #[cfg(feature = "pdf")]
    fn write_pdf(path: &Path, pages: &[&str]) {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 14.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(Object::from(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_pages_are_joined_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("laporan.pdf");
        write_pdf(&path, &["Kucing makan ikan", "Nasi goreng enak"]);

        let text = extract(&path, FileType::Pdf).unwrap();
        assert!(!text.contains('\n'), "{text:?}");
        assert_eq!(text, text.trim());
        assert_eq!(
            text.split_whitespace().collect::<Vec<_>>(),
            ["Kucing", "makan", "ikan", "Nasi", "goreng", "enak"]
        );
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn corrupt_pdf_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rusak.pdf");
        fs::write(&path, "bukan pdf").unwrap();
        assert!(matches!(
            extract(&path, FileType::Pdf),
            Err(SimError::Extraction { .. })
        ));
    }
}
