//! Terminal client.
//!
//! Walks the user from a document to a quiz, a summary or a Q&A chat, all
//! backed by the HTTP API. Can also play a question file offline.

mod api;
mod client;
mod quiz_screen;
mod state;
mod ui;

pub use api::{summary_path, ApiClient, ClientError, DocumentUpload};
pub use client::{play, run};
pub use quiz_screen::QuizScreen;
pub use state::{
    reading_minutes, word_count, AppEvent, ChatView, ClientApp, Mode, Screen, SummaryView,
    UploadRequest, UploadWizard, WizardStep,
};
