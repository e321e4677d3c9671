//! Client for the external generation script.
//!
//! Every call spawns `<program> [script] <operation> <args...>` and reads one
//! JSON object from stdout. The exit code and the `success` flag decide
//! whether the call failed.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::GeneratorSettings;
use crate::models::RawQuestion;
use crate::protocol::{ChatMessage, DocType, QuizLevel, SummaryLength};

/// Longest stdout excerpt kept in a malformed-output error.
const OUTPUT_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Failed to start generation process '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Generation process I/O failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("Generation process failed with code {}. Stderr: {stderr}", code.map_or("unknown".to_string(), |c| c.to_string()))]
    Failed { code: Option<i32>, stderr: String },
    #[error("Generation process returned an error: {0}")]
    Reported(String),
    #[error("Failed to parse generation output. Output: {output}")]
    Malformed { output: String },
    #[error("Generation output for '{operation}' is missing data: {detail}")]
    MissingField {
        operation: &'static str,
        detail: String,
    },
    #[error("Generation process timed out after {secs}s")]
    Timeout { secs: u64 },
}

#[derive(Debug, Clone)]
pub struct Generator {
    program: String,
    script: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ProcessOutput {
    doc_id: String,
}

#[derive(Deserialize)]
struct QuizOutput {
    quiz: GeneratedQuiz,
}

#[derive(Deserialize)]
struct GeneratedQuiz {
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary: GeneratedSummary,
}

#[derive(Deserialize)]
struct GeneratedSummary {
    content: String,
}

#[derive(Deserialize)]
struct AnswerOutput {
    answer: String,
}

impl Generator {
    pub fn new(settings: &GeneratorSettings) -> Self {
        Self {
            program: settings.program.clone(),
            script: settings.script.clone(),
            working_dir: settings.working_dir.clone(),
            timeout: settings.timeout(),
        }
    }

    /// Index a document's text. Returns the opaque `doc_id`.
    pub async fn process_document(
        &self,
        text: &str,
        file_name: &str,
        doc_type: DocType,
    ) -> Result<String, GeneratorError> {
        let output = self
            .run("process", &[text, file_name, doc_type.as_str()])
            .await?;
        let processed: ProcessOutput = decode("process", output)?;
        Ok(processed.doc_id)
    }

    pub async fn generate_quiz(
        &self,
        doc_id: &str,
        num_questions: u32,
        level: QuizLevel,
    ) -> Result<Vec<RawQuestion>, GeneratorError> {
        let count = num_questions.to_string();
        let output = self
            .run("generate_quiz", &[doc_id, &count, level.as_str()])
            .await?;
        let generated: QuizOutput = decode("generate_quiz", output)?;
        Ok(generated.quiz.questions)
    }

    pub async fn summarize(
        &self,
        doc_id: &str,
        length: SummaryLength,
    ) -> Result<String, GeneratorError> {
        let output = self.run("summarize", &[doc_id, length.as_str()]).await?;
        let generated: SummaryOutput = decode("summarize", output)?;
        Ok(generated.summary.content)
    }

    /// Answer a question about a processed document, with recent chat
    /// history passed as a JSON array.
    pub async fn answer(
        &self,
        doc_id: &str,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<String, GeneratorError> {
        let history = serde_json::to_string(history).map_err(|e| GeneratorError::MissingField {
            operation: "answer",
            detail: e.to_string(),
        })?;
        let output = self.run("answer", &[doc_id, question, &history]).await?;
        let generated: AnswerOutput = decode("answer", output)?;
        Ok(generated.answer)
    }

    /// Run one operation and return its JSON output.
    pub async fn run(&self, operation: &str, args: &[&str]) -> Result<JsonValue, GeneratorError> {
        let mut command = Command::new(&self.program);
        if let Some(script) = &self.script {
            command.arg(script);
        }
        command
            .arg(operation)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        info!(operation, "running generation process");
        let child = command.spawn().map_err(|source| GeneratorError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // On timeout the child is dropped, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GeneratorError::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(GeneratorError::Io)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(operation, "generator: {}", line);
        }

        if !output.status.success() {
            return Err(GeneratorError::Failed {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value: JsonValue =
            serde_json::from_str(stdout.trim()).map_err(|_| GeneratorError::Malformed {
                output: excerpt(&stdout),
            })?;

        if value.get("success").and_then(JsonValue::as_bool) == Some(false) {
            let message = value
                .get("error")
                .and_then(JsonValue::as_str)
                .unwrap_or("unknown error");
            return Err(GeneratorError::Reported(message.to_string()));
        }

        Ok(value)
    }
}

fn decode<T: DeserializeOwned>(
    operation: &'static str,
    value: JsonValue,
) -> Result<T, GeneratorError> {
    serde_json::from_value(value).map_err(|e| GeneratorError::MissingField {
        operation,
        detail: e.to_string(),
    })
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > OUTPUT_EXCERPT_LEN {
        let truncated: String = text.chars().take(OUTPUT_EXCERPT_LEN).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    /// A generator whose script is the given shell snippet.
    fn stub(body: &str) -> (TempDir, Generator) {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("stub.sh");
        fs::write(&script, body).unwrap();

        let generator = Generator::new(&GeneratorSettings {
            program: "sh".to_string(),
            script: Some(script),
            working_dir: None,
            timeout_secs: 10,
        });
        (dir, generator)
    }

    #[tokio::test]
    async fn test_process_returns_doc_id() {
        let (_dir, generator) = stub(
            r#"[ "$1" = process ] && [ "$4" = pdf ] || exit 9
echo '{"success": true, "doc_id": "doc-42", "chunks_count": 3}'"#,
        );

        let doc_id = generator
            .process_document("some text", "notes.pdf", DocType::Pdf)
            .await
            .unwrap();
        assert_eq!(doc_id, "doc-42");
    }

    #[tokio::test]
    async fn test_generate_quiz_passes_arguments() {
        let (_dir, generator) = stub(
            r#"[ "$1" = generate_quiz ] && [ "$2" = doc-1 ] && [ "$3" = 2 ] && [ "$4" = hard ] || exit 9
echo '{"success": true, "quiz": {"questions": [
  {"question": "Q1", "options": ["a", "b"], "correctAnswer": 1},
  {"question": "Q2", "options": ["a", "b"], "correctAnswer": "a"}
]}}'"#,
        );

        let questions = generator
            .generate_quiz("doc-1", 2, QuizLevel::Hard)
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].text, "Q2");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let (_dir, generator) = stub("echo 'GEMINI_API_KEY missing' >&2\nexit 3");

        let err = generator.summarize("doc", SummaryLength::Short).await.unwrap_err();
        match err {
            GeneratorError::Failed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "GEMINI_API_KEY missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_reported_failure() {
        let (_dir, generator) =
            stub(r#"echo '{"success": false, "error": "No content found for the given document ID."}'"#);

        let err = generator.summarize("doc", SummaryLength::Medium).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Generation process returned an error: No content found for the given document ID."
        );
    }

    #[tokio::test]
    async fn test_non_json_output_is_malformed() {
        let (_dir, generator) = stub("echo 'Connected to existing collection'");

        let err = generator.run("process", &[]).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_missing_field() {
        let (_dir, generator) = stub(r#"echo '{"success": true}'"#);

        let err = generator.answer("doc", "why?", &[]).await.unwrap_err();
        assert!(matches!(err, GeneratorError::MissingField { operation: "answer", .. }));
    }

    #[tokio::test]
    async fn test_answer_sends_history_json() {
        let (_dir, generator) = stub(
            r#"case "$4" in
  *'"role":"user"'*) echo '{"success": true, "answer": "It is green."}' ;;
  *) exit 9 ;;
esac"#,
        );

        let answer = generator
            .answer("doc", "What colour?", &[ChatMessage::user("Hello")])
            .await
            .unwrap();
        assert_eq!(answer, "It is green.");
    }

    #[tokio::test]
    async fn test_timeout_kills_the_process() {
        let (_dir, mut generator) = stub("sleep 5");
        generator.timeout = Duration::from_millis(200);

        let err = generator.run("process", &[]).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let generator = Generator::new(&GeneratorSettings {
            program: "doc-quiz-no-such-interpreter".to_string(),
            ..GeneratorSettings::default()
        });

        let err = generator.run("process", &[]).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Spawn { .. }));
    }
}
