//! HTTP client for the document API.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::Question;
use crate::protocol::{
    AskRequest, AskResponse, ChatMessage, DocType, ErrorResponse, GenerateQuizResponse,
    ProcessResponse, QuizLevel, SummaryLength, SummaryResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

/// A local file to upload, with the type chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub path: PathBuf,
    pub doc_type: DocType,
}

impl DocumentUpload {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    async fn to_part(&self) -> Result<Part, ClientError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ClientError::Io {
                path: self.path.clone(),
                source,
            })?;
        let file_name = self.file_name();
        let mime = self.doc_type.mime_for(&file_name);
        Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime)?)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn generate_quiz(
        &self,
        upload: &DocumentUpload,
        num_questions: u32,
        level: QuizLevel,
    ) -> Result<Vec<Question>, ClientError> {
        let form = Form::new()
            .part("file", upload.to_part().await?)
            .text("numQuestions", num_questions.to_string())
            .text("level", level.as_str());

        info!(file = %upload.path.display(), num_questions, "requesting quiz");
        let response: GenerateQuizResponse = self.post_form("/api/generate-quiz", form).await?;
        Ok(response.quiz.questions)
    }

    pub async fn summarize(
        &self,
        upload: &DocumentUpload,
        length: SummaryLength,
    ) -> Result<SummaryResponse, ClientError> {
        let form = Form::new()
            .part("file", upload.to_part().await?)
            .text("length", length.as_str());

        info!(file = %upload.path.display(), length = length.as_str(), "requesting summary");
        self.post_form("/api/summarize", form).await
    }

    pub async fn process(&self, upload: &DocumentUpload) -> Result<ProcessResponse, ClientError> {
        let form = Form::new().part("file", upload.to_part().await?);

        info!(file = %upload.path.display(), "processing document");
        self.post_form("/api/process", form).await
    }

    pub async fn ask(
        &self,
        doc_id: &str,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<String, ClientError> {
        let request = AskRequest {
            doc_id: doc_id.to_string(),
            question: question.to_string(),
            history: history.to_vec(),
        };
        let response = self
            .http
            .post(self.url("/api/ask"))
            .json(&request)
            .send()
            .await?;
        let answer: AskResponse = decode(response).await?;
        Ok(answer.answer)
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ClientError> {
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        decode(response).await
    }
}

/// Decode a success body, or turn an error body into `ClientError::Api`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(%status, body = %body, "API error");
    Err(ClientError::Api {
        status,
        message: error_message(status, &body),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| format!("Server returned {}", status))
}

/// Path of the file a summary is saved to: `<file name>-summary.txt` next to
/// the original document.
pub fn summary_path(document: &Path, file_name: &str) -> PathBuf {
    let name = if file_name.is_empty() { "document" } else { file_name };
    document
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{}-summary.txt", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_body() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"Unsupported file type."}"#),
            "Unsupported file type."
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            "Server returned 502 Bad Gateway"
        );
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.url("/api/health"), "http://localhost:8000/api/health");
    }

    #[test]
    fn test_summary_path() {
        assert_eq!(
            summary_path(Path::new("/docs/biology.pdf"), "biology.pdf"),
            PathBuf::from("/docs/biology.pdf-summary.txt")
        );
        assert_eq!(
            summary_path(Path::new("notes.docx"), ""),
            PathBuf::from("document-summary.txt")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let upload = DocumentUpload {
            path: PathBuf::from("/definitely/not/here.pdf"),
            doc_type: DocType::Pdf,
        };
        let err = upload.to_part().await.unwrap_err();
        assert!(matches!(err, ClientError::Io { .. }));
    }
}
