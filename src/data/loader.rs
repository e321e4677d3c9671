use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::{normalize_questions, Question, RawQuestion};

/// Error loading a question file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} must contain at least one question", path.display())]
    Empty { path: PathBuf },
}

/// Accepts either a bare array or the `{ "questions": [...] }` envelope the
/// generator produces.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    List(Vec<RawQuestion>),
    Quiz { questions: Vec<RawQuestion> },
}

impl QuestionFile {
    fn into_questions(self) -> Vec<RawQuestion> {
        match self {
            QuestionFile::List(questions) | QuestionFile::Quiz { questions } => questions,
        }
    }
}

/// Parse and normalize questions from JSON text.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, serde_json::Error> {
    let file: QuestionFile = serde_json::from_str(json)?;
    Ok(normalize_questions(file.into_questions()))
}

pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let questions = parse_questions(&json_content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if questions.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_envelope_and_normalizes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"questions": [{{"question": "2 + 2?", "options": ["3", "4"], "correctAnswer": "4"}}]}}"#
        )
        .unwrap();

        let questions = load_questions_from_json(file.path()).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_index, Some(1));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        let err = load_questions_from_json(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_questions_from_json("/nonexistent/questions.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/questions.json"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_questions("{ not json").is_err());
    }
}
