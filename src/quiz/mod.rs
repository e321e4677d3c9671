//! The quiz-taking flow: session state, scoring and the countdown.

mod result;
mod session;
mod timer;

pub use result::{format_clock, review, Performance, QuizResult, ReviewEntry, Verdict};
pub use session::{
    FinishReason, Outcome, Phase, QuestionIndex, QuizSession, TickOutcome, REVEAL_DELAY,
    TIME_BUDGET_SECS,
};
pub use timer::{Timer, TICK_INTERVAL};
