//! Request and response bodies for the HTTP API.
//!
//! All bodies are JSON with camelCase keys, except uploads which are
//! multipart forms.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Question;

/// MIME type browsers send for Word documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Question count limits accepted by the API.
pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 50;
pub const DEFAULT_QUESTIONS: u32 = 5;

/// Number of trailing chat messages sent along with a question.
pub const HISTORY_WINDOW: usize = 6;

/// Kind of uploaded document; decides which extractor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Pdf,
    Docx,
    Photo,
}

impl DocType {
    pub const ALL: [DocType; 3] = [DocType::Pdf, DocType::Docx, DocType::Photo];

    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or_default().trim();
        match mime {
            "application/pdf" => Some(DocType::Pdf),
            DOCX_MIME => Some(DocType::Docx),
            m if m.starts_with("image/") => Some(DocType::Photo),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocType::Pdf),
            "docx" => Some(DocType::Docx),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => {
                Some(DocType::Photo)
            }
            _ => None,
        }
    }

    /// Name passed to the generation process.
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Pdf => "pdf",
            DocType::Docx => "docx",
            DocType::Photo => "photo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocType::Pdf => "PDF Document",
            DocType::Docx => "Word Document",
            DocType::Photo => "Image/Photo",
        }
    }

    /// MIME type used when uploading a file of this kind.
    pub fn mime_for(self, file_name: &str) -> &'static str {
        match self {
            DocType::Pdf => "application/pdf",
            DocType::Docx => DOCX_MIME,
            DocType::Photo => {
                let lower = file_name.to_ascii_lowercase();
                if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
                    "image/jpeg"
                } else if lower.ends_with(".gif") {
                    "image/gif"
                } else if lower.ends_with(".webp") {
                    "image/webp"
                } else if lower.ends_with(".bmp") {
                    "image/bmp"
                } else if lower.ends_with(".tif") || lower.ends_with(".tiff") {
                    "image/tiff"
                } else {
                    "image/png"
                }
            }
        }
    }
}

/// Quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl QuizLevel {
    pub const ALL: [QuizLevel; 3] = [QuizLevel::Easy, QuizLevel::Medium, QuizLevel::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizLevel::Easy => "easy",
            QuizLevel::Medium => "medium",
            QuizLevel::Hard => "hard",
        }
    }
}

/// Summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Detailed,
}

impl SummaryLength {
    pub const ALL: [SummaryLength; 3] = [
        SummaryLength::Short,
        SummaryLength::Medium,
        SummaryLength::Detailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Detailed => "detailed",
        }
    }
}

/// Error for an unrecognized enum value in a form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {field}: '{value}'")]
pub struct UnknownValue {
    pub field: &'static str,
    pub value: String,
}

impl FromStr for QuizLevel {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuizLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownValue {
                field: "level",
                value: s.to_string(),
            })
    }
}

impl FromStr for SummaryLength {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SummaryLength::ALL
            .into_iter()
            .find(|length| length.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownValue {
                field: "length",
                value: s.to_string(),
            })
    }
}

/// Validates a requested question count.
pub fn validate_question_count(raw: &str) -> Result<u32, String> {
    let count: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("numQuestions must be a number, got '{}'", raw))?;

    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
        return Err(format!(
            "numQuestions must be between {} and {}",
            MIN_QUESTIONS, MAX_QUESTIONS
        ));
    }

    Ok(count)
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

/// One entry in a Q&A transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPayload {
    pub questions: Vec<Question>,
}

/// Response of `POST /api/generate-quiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub message: String,
    pub quiz: QuizPayload,
}

/// Response of `POST /api/summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub message: String,
    pub content: String,
    pub file_name: String,
}

/// Response of `POST /api/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub message: String,
    pub doc_id: String,
    pub file_name: String,
}

/// Body of `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub doc_id: String,
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Response of `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
