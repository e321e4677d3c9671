//! # doc-quiz
//!
//! Turn documents into quizzes, summaries and Q&A sessions.
//!
//! The crate has two halves. [`server`] is an HTTP API that extracts text
//! from uploaded PDF, DOCX and image files and hands it to an external
//! generation process. [`client`] is a terminal UI that talks to that API
//! and runs the quiz itself.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use doc_quiz::{Error, Quiz};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     // Play a question file without a server
//!     let quiz = Quiz::from_json("questions.json")?;
//!     quiz.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod data;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod quiz;
pub mod server;
pub mod terminal;

use std::io;
use std::path::Path;

use thiserror::Error;

pub use config::{Config, ConfigError};
pub use data::{load_questions_from_json, LoadError};
pub use models::Question;

/// Any error the library can return.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to load questions: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] server::ServerError),
    #[error(transparent)]
    Client(#[from] client::ClientError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A question set that can be played in the terminal without a server.
pub struct Quiz {
    questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Load a quiz from a JSON file.
    ///
    /// The file holds either an array of questions or an object with a
    /// `questions` array, in the same shape the generator returns.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use doc_quiz::Quiz;
    ///
    /// let quiz = Quiz::from_json("questions.json").expect("Failed to load quiz");
    /// assert!(!quiz.questions().is_empty());
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let questions = load_questions_from_json(path)?;
        Ok(Self::new(questions))
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Run the quiz in the terminal.
    ///
    /// Takes over the terminal and returns when the user leaves the quiz.
    pub async fn run(self) -> Result<(), Error> {
        client::play(self.questions).await?;
        Ok(())
    }
}
