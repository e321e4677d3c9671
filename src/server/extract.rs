//! Text extraction from uploaded documents.

use std::io::{Cursor, Read};
use std::process::Stdio;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::OcrSettings;
use crate::protocol::DocType;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to parse PDF file: {0}")]
    Pdf(String),
    #[error("Failed to parse DOCX file: {0}")]
    Docx(String),
    #[error("Failed to parse image file: {0}")]
    Ocr(String),
    #[error("OCR process timed out after {secs}s")]
    OcrTimeout { secs: u64 },
    #[error("No text could be extracted from the document.")]
    EmptyText,
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Runs the extractor matching a document's type.
#[derive(Debug, Clone)]
pub struct Extractor {
    ocr: OcrSettings,
}

impl Extractor {
    pub fn new(ocr: OcrSettings) -> Self {
        Self { ocr }
    }

    /// Extract trimmed plain text. Empty output is an error.
    pub async fn extract(&self, doc_type: DocType, bytes: Vec<u8>) -> Result<String, ExtractError> {
        let size = bytes.len();
        let text = match doc_type {
            DocType::Pdf => tokio::task::spawn_blocking(move || extract_pdf(&bytes)).await??,
            DocType::Docx => tokio::task::spawn_blocking(move || extract_docx(&bytes)).await??,
            DocType::Photo => self.extract_image(&bytes).await?,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractError::EmptyText);
        }

        info!(
            doc_type = doc_type.as_str(),
            bytes = size,
            chars = text.chars().count(),
            "extracted text"
        );
        Ok(text.to_string())
    }

    /// OCR through the tesseract CLI, image bytes on stdin.
    async fn extract_image(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let timeout = self.ocr.timeout();
        // On timeout the child is dropped, which kills it.
        tokio::time::timeout(timeout, self.run_ocr(bytes))
            .await
            .map_err(|_| ExtractError::OcrTimeout {
                secs: timeout.as_secs(),
            })?
    }

    async fn run_ocr(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.ocr.program)
            .args(["stdin", "stdout", "-l", &self.ocr.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExtractError::Ocr(format!("failed to start {}: {}", self.ocr.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractError::Ocr("OCR process has no stdin".to_string()))?;
        stdin
            .write_all(bytes)
            .await
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(stderr.trim().to_string()));
        }

        debug!(bytes = output.stdout.len(), "OCR finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed font tables.
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractError::Pdf("the PDF parser crashed".to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}

pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    Ok(document_xml_to_text(&xml))
}

static DOCX_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br/>").expect("valid regex")
});

/// Flatten WordprocessingML to text: runs are concatenated, paragraphs and
/// breaks become newlines, tabs stay tabs.
fn document_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    for token in DOCX_TOKENS.captures_iter(xml) {
        match token.get(1) {
            Some(run) => text.push_str(&unescape_xml(run.as_str())),
            None => match &token[0] {
                "<w:tab/>" => text.push('\t'),
                _ => text.push('\n'),
            },
        }
    }
    text.trim().to_string()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    /// Build a minimal .docx holding the given paragraphs.
    pub(crate) fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, p))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                "word/document.xml",
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored),
            )
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_document_xml_to_text() {
        let xml = r#"<w:body><w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p><w:p><w:r><w:tab/><w:t>Fish &amp; chips</w:t></w:r></w:p><w:tbl/></w:body>"#;
        assert_eq!(document_xml_to_text(xml), "Hello world\n\tFish & chips");
    }

    #[test]
    fn test_extract_docx() {
        let bytes = docx_with_paragraphs(&["Photosynthesis", "Plants make sugar."]);
        let text = extract_docx(&bytes).unwrap();
        assert_eq!(text, "Photosynthesis\nPlants make sugar.");
    }

    #[test]
    fn test_extract_docx_rejects_garbage() {
        let err = extract_docx(b"not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[test]
    fn test_extract_pdf_rejects_garbage() {
        let err = extract_pdf(b"%PDF-nope").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_empty_document_is_an_error() {
        let extractor = Extractor::new(OcrSettings::default());
        let bytes = docx_with_paragraphs(&["   "]);
        let err = extractor.extract(DocType::Docx, bytes).await.unwrap_err();
        assert!(matches!(err, ExtractError::EmptyText));
    }

    #[tokio::test]
    async fn test_missing_ocr_program() {
        let extractor = Extractor::new(OcrSettings {
            program: "doc-quiz-no-such-ocr".to_string(),
            ..OcrSettings::default()
        });
        let err = extractor.extract(DocType::Photo, vec![0u8; 8]).await.unwrap_err();
        assert!(matches!(err, ExtractError::Ocr(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_ocr_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("slow-ocr");
        std::fs::write(&program, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let extractor = Extractor::new(OcrSettings {
            program: program.display().to_string(),
            timeout_secs: 1,
            ..OcrSettings::default()
        });
        let started = std::time::Instant::now();
        let err = extractor.extract(DocType::Photo, vec![0u8; 8]).await.unwrap_err();

        assert!(matches!(err, ExtractError::OcrTimeout { secs: 1 }));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }
}
