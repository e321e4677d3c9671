//! Request handlers for the HTTP API.

use std::sync::Arc;

use tracing::info;
use warp::multipart::FormData;
use warp::{Rejection, Reply};

use super::error::ApiError;
use super::extract::Extractor;
use super::generator::Generator;
use super::upload::{Upload, UploadedFile};
use crate::config::Config;
use crate::models::normalize_questions;
use crate::protocol::{
    validate_question_count, AskRequest, AskResponse, GenerateQuizResponse, HealthResponse,
    ProcessResponse, QuizLevel, QuizPayload, SummaryLength, SummaryResponse, DEFAULT_QUESTIONS,
    HISTORY_WINDOW,
};

/// Everything a handler needs. Immutable after startup.
#[derive(Debug)]
pub struct ApiState {
    pub config: Config,
    pub extractor: Extractor,
    pub generator: Generator,
}

impl ApiState {
    pub fn new(config: Config) -> Self {
        Self {
            extractor: Extractor::new(config.ocr.clone()),
            generator: Generator::new(&config.generator),
            config,
        }
    }

    /// Extract a document's text and hand it to the generator for indexing.
    async fn process(&self, file: UploadedFile) -> Result<(String, String), ApiError> {
        info!(
            doc_type = file.doc_type.as_str(),
            file_name = %file.file_name,
            "processing document"
        );
        let text = self.extractor.extract(file.doc_type, file.bytes).await?;
        let doc_id = self
            .generator
            .process_document(&text, &file.file_name, file.doc_type)
            .await?;
        info!(doc_id = %doc_id, "document processed");
        Ok((doc_id, file.file_name))
    }
}

pub type SharedState = Arc<ApiState>;

pub async fn health() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&HealthResponse {
        status: "ok".to_string(),
    }))
}

pub async fn generate_quiz(state: SharedState, form: FormData) -> Result<impl Reply, Rejection> {
    let mut upload = Upload::collect(form).await?;
    let file = upload.take_file()?;
    let num_questions = match upload.field("numQuestions") {
        Some(raw) => validate_question_count(raw).map_err(ApiError::InvalidParam)?,
        None => DEFAULT_QUESTIONS,
    };
    let level: QuizLevel = parse_field(&upload, "level")?;

    let (doc_id, _) = state.process(file).await?;
    let raw = state
        .generator
        .generate_quiz(&doc_id, num_questions, level)
        .await
        .map_err(ApiError::from)?;
    let questions = normalize_questions(raw);
    if questions.is_empty() {
        return Err(ApiError::NoQuestions.into());
    }
    info!(count = questions.len(), level = level.as_str(), "quiz generated");

    Ok(warp::reply::json(&GenerateQuizResponse {
        message: "Quiz generated successfully!".to_string(),
        quiz: QuizPayload { questions },
    }))
}

pub async fn summarize(state: SharedState, form: FormData) -> Result<impl Reply, Rejection> {
    let mut upload = Upload::collect(form).await?;
    let file = upload.take_file()?;
    let length: SummaryLength = parse_field(&upload, "length")?;

    let (doc_id, file_name) = state.process(file).await?;
    let content = state
        .generator
        .summarize(&doc_id, length)
        .await
        .map_err(ApiError::from)?;
    info!(length = length.as_str(), chars = content.len(), "summary generated");

    Ok(warp::reply::json(&SummaryResponse {
        message: "Summary generated successfully!".to_string(),
        content,
        file_name,
    }))
}

pub async fn process(state: SharedState, form: FormData) -> Result<impl Reply, Rejection> {
    let mut upload = Upload::collect(form).await?;
    let file = upload.take_file()?;
    let (doc_id, file_name) = state.process(file).await?;

    Ok(warp::reply::json(&ProcessResponse {
        message: "Document processed successfully!".to_string(),
        doc_id,
        file_name,
    }))
}

pub async fn ask(state: SharedState, request: AskRequest) -> Result<impl Reply, Rejection> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::InvalidParam("Question must not be empty.".to_string()).into());
    }
    if request.doc_id.trim().is_empty() {
        return Err(ApiError::InvalidParam("docId is required.".to_string()).into());
    }

    let skip = request.history.len().saturating_sub(HISTORY_WINDOW);
    let history = &request.history[skip..];
    let answer = state
        .generator
        .answer(&request.doc_id, question, history)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&AskResponse { answer }))
}

/// Parse an optional enum field, falling back to its default when absent.
fn parse_field<T>(upload: &Upload, name: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    match upload.field(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ApiError::InvalidParam(e.to_string())),
        None => Ok(T::default()),
    }
}
