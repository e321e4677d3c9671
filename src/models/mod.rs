mod question;

pub use question::{normalize_questions, CorrectAnswer, Question, RawQuestion};
