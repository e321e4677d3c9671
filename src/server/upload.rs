//! Multipart upload collection.

use std::collections::HashMap;

use futures_util::TryStreamExt;
use tracing::debug;
use warp::multipart::{FormData, Part};
use warp::Buf;

use super::error::ApiError;
use crate::protocol::DocType;

/// Form field carrying the document.
pub const FILE_FIELD: &str = "file";

/// An uploaded document with its detected type.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub doc_type: DocType,
    pub bytes: Vec<u8>,
}

/// A fully buffered multipart form: the document plus its text fields.
#[derive(Debug, Default)]
pub struct Upload {
    file: Option<UploadedFile>,
    unsupported: bool,
    fields: HashMap<String, String>,
}

impl Upload {
    /// Drain a multipart form into memory.
    pub async fn collect(form: FormData) -> Result<Self, ApiError> {
        let mut upload = Upload::default();
        let mut parts = Box::pin(form);

        while let Some(part) = parts.try_next().await.map_err(form_error)? {
            let name = part.name().to_string();
            let file_name = part.filename().map(str::to_string);
            let content_type = part.content_type().map(str::to_string);
            let bytes = read_part(part).await?;

            if name == FILE_FIELD {
                let file_name = file_name.unwrap_or_else(|| "upload".to_string());
                let doc_type = detect_doc_type(content_type.as_deref(), &file_name);
                debug!(
                    file_name = %file_name,
                    content_type = ?content_type,
                    bytes = bytes.len(),
                    "received upload"
                );
                match doc_type {
                    Some(doc_type) => {
                        upload.file = Some(UploadedFile {
                            file_name,
                            doc_type,
                            bytes,
                        })
                    }
                    None => upload.unsupported = true,
                }
            } else {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                upload.fields.insert(name, value);
            }
        }

        Ok(upload)
    }

    /// The document, or the reason there is none.
    pub fn take_file(&mut self) -> Result<UploadedFile, ApiError> {
        match self.file.take() {
            Some(file) => Ok(file),
            None if self.unsupported => Err(ApiError::UnsupportedType),
            None => Err(ApiError::NoFile),
        }
    }

    /// A non-blank text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Type from the declared MIME type, falling back to the extension when the
/// client sent none or a generic one.
fn detect_doc_type(content_type: Option<&str>, file_name: &str) -> Option<DocType> {
    match content_type {
        Some(mime) if !mime.starts_with("application/octet-stream") => {
            DocType::from_mime(mime)
        }
        _ => DocType::from_file_name(file_name),
    }
}

async fn read_part(part: Part) -> Result<Vec<u8>, ApiError> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, mut chunk| async move {
            while chunk.has_remaining() {
                let bytes = chunk.chunk();
                let len = bytes.len();
                acc.extend_from_slice(bytes);
                chunk.advance(len);
            }
            Ok(acc)
        })
        .await
        .map_err(form_error)
}

fn form_error(err: warp::Error) -> ApiError {
    ApiError::InvalidParam(format!("Malformed upload: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_doc_type_prefers_mime() {
        assert_eq!(
            detect_doc_type(Some("application/pdf"), "scan.png"),
            Some(DocType::Pdf)
        );
        assert_eq!(detect_doc_type(Some("text/plain"), "notes.pdf"), None);
    }

    #[test]
    fn test_detect_doc_type_falls_back_to_extension() {
        assert_eq!(detect_doc_type(None, "Lecture.DOCX"), Some(DocType::Docx));
        assert_eq!(
            detect_doc_type(Some("application/octet-stream"), "board.jpg"),
            Some(DocType::Photo)
        );
        assert_eq!(detect_doc_type(None, "README"), None);
    }

    #[test]
    fn test_take_file_reports_why() {
        let mut empty = Upload::default();
        assert!(matches!(empty.take_file(), Err(ApiError::NoFile)));

        let mut unsupported = Upload {
            unsupported: true,
            ..Upload::default()
        };
        assert!(matches!(unsupported.take_file(), Err(ApiError::UnsupportedType)));
    }

    #[test]
    fn test_blank_field_is_absent() {
        let upload = Upload {
            fields: HashMap::from([
                ("level".to_string(), "  ".to_string()),
                ("numQuestions".to_string(), " 7 ".to_string()),
            ]),
            ..Upload::default()
        };
        assert_eq!(upload.field("level"), None);
        assert_eq!(upload.field("numQuestions"), Some("7"));
    }
}
