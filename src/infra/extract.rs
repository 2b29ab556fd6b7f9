//! Plain-text extraction for uploaded files (.txt and .docx).

use crate::domain::AssistError;
use anyhow::Context as _;
use log::debug;
use roxmltree::{Document, Node};
use std::io::{Cursor, Read};
use std::path::Path;

pub const TEXT_PLAIN: &str = "text/plain";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    /// MIME type as reported by the uploader, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    PlainText,
    Docx,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    /// Read a file from disk, guessing the content type from its extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = content_type_for(&name).map(str::to_string);
        Ok(Self::new(name, content_type, bytes))
    }

    pub fn kind(&self) -> Option<FileKind> {
        match self.content_type.as_deref() {
            Some(TEXT_PLAIN) => Some(FileKind::PlainText),
            Some(DOCX_MIME) => Some(FileKind::Docx),
            Some(_) => None,
            None => match content_type_for(&self.name) {
                Some(TEXT_PLAIN) => Some(FileKind::PlainText),
                Some(DOCX_MIME) => Some(FileKind::Docx),
                _ => None,
            },
        }
    }

    fn type_label(&self) -> String {
        if let Some(content_type) = &self.content_type {
            return content_type.clone();
        }
        Path::new(&self.name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub fn content_type_for(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "txt" => Some(TEXT_PLAIN),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}

pub fn extract_plain_text(file: &UploadedFile) -> Result<String, AssistError> {
    match file.kind() {
        Some(FileKind::PlainText) => Ok(String::from_utf8_lossy(&file.bytes).into_owned()),
        Some(FileKind::Docx) => {
            let text = docx_text(&file.bytes).map_err(|err| {
                AssistError::capability(format!("Failed to read DOCX file content: {err:#}"))
            })?;
            debug!("read {} chars from {}", text.chars().count(), file.name);
            Ok(text)
        }
        None => Err(AssistError::UnsupportedInput(format!(
            "Unsupported file type: {}. Please upload .txt or .docx",
            file.type_label()
        ))),
    }
}

fn docx_text(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("not a zip archive")?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("missing word/document.xml")?
        .read_to_string(&mut xml)
        .context("read word/document.xml")?;

    let doc = Document::parse(&xml).context("parse word/document.xml")?;
    let mut paragraphs = Vec::new();
    collect_paragraphs(doc.root_element(), &mut paragraphs);
    Ok(paragraphs.join("\n\n"))
}

fn is_word(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(WORD_NS)
}

fn collect_paragraphs(node: Node<'_, '_>, out: &mut Vec<String>) {
    for child in node.children() {
        if is_word(child, "p") {
            let mut text = String::new();
            collect_runs(child, &mut text, out);
            out.push(text);
        } else {
            collect_paragraphs(child, out);
        }
    }
}

fn collect_runs(node: Node<'_, '_>, text: &mut String, out: &mut Vec<String>) {
    for child in node.children() {
        if is_word(child, "t") {
            text.push_str(child.text().unwrap_or_default());
        } else if is_word(child, "tab") {
            text.push('\t');
        } else if is_word(child, "br") || is_word(child, "cr") {
            text.push('\n');
        } else if is_word(child, "p") {
            // text boxes nest whole paragraphs inside a run
            let mut nested = String::new();
            collect_runs(child, &mut nested, out);
            out.push(nested);
        } else {
            collect_runs(child, text, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORD_NS}"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_plain_text_is_lossy_utf8() {
        let file = UploadedFile::new(
            "notes.txt",
            Some(TEXT_PLAIN.into()),
            b"caf\xc3\xa9 \xff".to_vec(),
        );
        assert_eq!(extract_plain_text(&file).unwrap(), "café \u{fffd}");
    }

    #[test]
    fn test_docx_paragraphs_and_runs() {
        let bytes = docx(
            "<w:p><w:r><w:t>Total:</w:t></w:r><w:r><w:tab/><w:t>42</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t><w:br/><w:t>two</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        let file = UploadedFile::new("report.docx", None, bytes);
        assert_eq!(extract_plain_text(&file).unwrap(), "Total:\t42\n\ncell\ntwo");
    }

    #[test]
    fn test_broken_docx_is_capability_error() {
        let file = UploadedFile::new("report.docx", Some(DOCX_MIME.into()), b"not a zip".to_vec());
        let err = extract_plain_text(&file).unwrap_err();
        assert!(matches!(err, AssistError::Capability(_)));
        assert!(err.to_string().starts_with("Failed to read DOCX file content:"));
    }

    #[test]
    fn test_unsupported_type() {
        let file = UploadedFile::new("scan.pdf", Some("application/pdf".into()), vec![]);
        assert_eq!(
            extract_plain_text(&file).unwrap_err().to_string(),
            "Unsupported file type: application/pdf. Please upload .txt or .docx"
        );

        let guessed = UploadedFile::new("scan.pdf", None, vec![]);
        assert_eq!(
            extract_plain_text(&guessed).unwrap_err(),
            AssistError::UnsupportedInput(
                "Unsupported file type: .pdf. Please upload .txt or .docx".into()
            )
        );
    }

    #[test]
    fn test_from_path_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sample.TXT");
        std::fs::write(&path, "hello").unwrap();
        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "Sample.TXT");
        assert_eq!(file.content_type.as_deref(), Some(TEXT_PLAIN));
        assert_eq!(file.kind(), Some(FileKind::PlainText));
    }
}
