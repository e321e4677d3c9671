//! Document API server.
//!
//! Accepts uploads over HTTP, extracts their text and delegates quiz,
//! summary and Q&A generation to an external process.

mod error;
mod extract;
mod generator;
mod handlers;
mod server;
mod upload;

pub use error::{handle_rejection, ApiError};
pub use extract::{extract_docx, extract_pdf, ExtractError, Extractor};
pub use generator::{Generator, GeneratorError};
pub use handlers::ApiState;
pub use server::{routes, run, ServerError};
