//! Quiz session state machine.
//!
//! A [`QuizSession`] is one attempt over a fixed, non-empty list of
//! questions. It moves `InProgress -> Finished -> Revealed` and never back.
//! All operations return an outcome instead of failing; the UI uses the
//! `can_*` queries to disable actions up front.

use std::time::Duration;

use uuid::Uuid;

use crate::models::Question;

use super::result::{self, QuizResult, ReviewEntry};

/// Time budget for one attempt.
pub const TIME_BUDGET_SECS: u32 = 600;

/// Delay between finishing and revealing the results.
pub const REVEAL_DELAY: Duration = Duration::from_millis(500);

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Finished,
    /// Results revealed. Behaves exactly like `Finished`.
    Revealed,
}

/// Why a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Submitted,
    TimedOut,
}

/// Result of a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed.
    Applied,
    /// Permitted, but nothing to do (clamped at a bound).
    Unchanged,
    /// The action is disabled in the current state.
    NotPermitted,
}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { remaining: u32 },
    /// The budget ran out on this tick and the session was force-finished.
    TimedOut,
    /// The session had already finished; the tick was ignored.
    Stopped,
}

/// Position of a question within a session.
///
/// Only a session hands these out, so a jump target is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionIndex(usize);

impl QuestionIndex {
    pub fn get(self) -> usize {
        self.0
    }

    /// 1-based number for display.
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    questions: Vec<Question>,
    current: usize,
    answers: Vec<Option<usize>>,
    remaining_secs: u32,
    phase: Phase,
    finish_reason: Option<FinishReason>,
}

impl QuizSession {
    /// Start a session. Returns `None` for an empty question list.
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }

        let answers = vec![None; questions.len()];
        Some(Self {
            id: Uuid::new_v4(),
            questions,
            current: 0,
            answers,
            remaining_secs: TIME_BUDGET_SECS,
            phase: Phase::InProgress,
            finish_reason: None,
        })
    }

    /// A fresh attempt over the same questions, with a new identity.
    pub fn restart(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            questions: self.questions.clone(),
            current: 0,
            answers: vec![None; self.questions.len()],
            remaining_secs: TIME_BUDGET_SECS,
            phase: Phase::InProgress,
            finish_reason: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == Phase::InProgress
    }

    pub fn is_finished(&self) -> bool {
        !self.is_in_progress()
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == Phase::Revealed
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn answer(&self, question: QuestionIndex) -> Option<usize> {
        self.answers.get(question.0).copied().flatten()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn current_index(&self) -> QuestionIndex {
        QuestionIndex(self.current)
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current]
    }

    /// All question positions, in order.
    pub fn indices(&self) -> impl Iterator<Item = QuestionIndex> + use<> {
        (0..self.questions.len()).map(QuestionIndex)
    }

    /// Position for a 0-based index, if the session has that many questions.
    pub fn index(&self, index: usize) -> Option<QuestionIndex> {
        (index < self.questions.len()).then_some(QuestionIndex(index))
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn can_go_previous(&self) -> bool {
        self.is_in_progress() && self.current > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.is_in_progress() && !self.is_last_question() && self.current_answer().is_some()
    }

    /// Finishing by hand requires the last question and every answer.
    pub fn can_finish(&self) -> bool {
        self.is_in_progress()
            && self.is_last_question()
            && self.answers.iter().all(Option::is_some)
    }

    /// Record (or overwrite) the answer for a question.
    pub fn select_option(&mut self, question: QuestionIndex, option: usize) -> Outcome {
        if !self.is_in_progress() {
            return Outcome::NotPermitted;
        }
        let Some(options) = self.questions.get(question.0).map(|q| q.options.len()) else {
            return Outcome::NotPermitted;
        };
        if option >= options {
            return Outcome::NotPermitted;
        }

        self.answers[question.0] = Some(option);
        Outcome::Applied
    }

    pub fn select_current(&mut self, option: usize) -> Outcome {
        self.select_option(self.current_index(), option)
    }

    /// Advance one question. Disabled while the current one is unanswered.
    pub fn go_next(&mut self) -> Outcome {
        if !self.is_in_progress() || self.current_answer().is_none() {
            return Outcome::NotPermitted;
        }
        if self.is_last_question() {
            return Outcome::Unchanged;
        }

        self.current += 1;
        Outcome::Applied
    }

    pub fn go_previous(&mut self) -> Outcome {
        if !self.is_in_progress() {
            return Outcome::NotPermitted;
        }
        if self.current == 0 {
            return Outcome::Unchanged;
        }

        self.current -= 1;
        Outcome::Applied
    }

    /// Jump directly to a question. Not gated on answers.
    pub fn go_to_question(&mut self, question: QuestionIndex) -> Outcome {
        if !self.is_in_progress() || question.0 >= self.questions.len() {
            return Outcome::NotPermitted;
        }
        if question.0 == self.current {
            return Outcome::Unchanged;
        }

        self.current = question.0;
        Outcome::Applied
    }

    /// Finish by user action. See [`QuizSession::can_finish`].
    pub fn finish(&mut self) -> Outcome {
        if !self.can_finish() {
            return Outcome::NotPermitted;
        }

        self.enter_finished(FinishReason::Submitted);
        Outcome::Applied
    }

    /// Count down one second; force-finish when the budget is spent.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_in_progress() {
            return TickOutcome::Stopped;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.enter_finished(FinishReason::TimedOut);
            return TickOutcome::TimedOut;
        }

        TickOutcome::Counting {
            remaining: self.remaining_secs,
        }
    }

    /// Move `Finished -> Revealed`. Returns false in any other phase.
    pub fn reveal(&mut self) -> bool {
        if self.phase != Phase::Finished {
            return false;
        }
        self.phase = Phase::Revealed;
        true
    }

    /// Score summary. `None` while the attempt is still running.
    pub fn result(&self) -> Option<QuizResult> {
        let reason = self.finish_reason?;
        Some(QuizResult::compute(
            &self.questions,
            &self.answers,
            self.remaining_secs,
            reason,
        ))
    }

    pub fn review(&self) -> Vec<ReviewEntry<'_>> {
        result::review(&self.questions, &self.answers)
    }

    fn enter_finished(&mut self, reason: FinishReason) {
        self.phase = Phase::Finished;
        self.finish_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_quiz(count: usize) -> QuizSession {
        let questions = (0..count)
            .map(|i| Question {
                text: format!("Question {}", i + 1),
                options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                correct_index: Some(1),
            })
            .collect();
        QuizSession::new(questions).unwrap()
    }

    fn idx(session: &QuizSession, n: usize) -> QuestionIndex {
        session.index(n).unwrap()
    }

    fn run_out_the_clock(session: &mut QuizSession) -> TickOutcome {
        let mut last = TickOutcome::Stopped;
        for _ in 0..TIME_BUDGET_SECS {
            last = session.tick();
        }
        last
    }

    #[test]
    fn test_empty_question_list_has_no_session() {
        assert!(QuizSession::new(Vec::new()).is_none());
    }

    #[test]
    fn test_answers_track_question_count() {
        let mut session = abc_quiz(4);
        assert_eq!(session.answers().len(), 4);

        session.select_current(2);
        session.go_next();
        session.go_to_question(idx(&session, 3));
        run_out_the_clock(&mut session);
        assert_eq!(session.answers().len(), 4);
    }

    #[test]
    fn test_navigation_clamps_at_bounds() {
        let mut session = abc_quiz(2);

        assert_eq!(session.go_previous(), Outcome::Unchanged);
        assert_eq!(session.current_index().get(), 0);

        session.select_current(0);
        assert_eq!(session.go_next(), Outcome::Applied);
        session.select_current(0);
        assert_eq!(session.go_next(), Outcome::Unchanged);
        assert_eq!(session.current_index().get(), 1);
    }

    #[test]
    fn test_go_next_requires_an_answer() {
        let mut session = abc_quiz(3);

        assert!(!session.can_go_next());
        assert_eq!(session.go_next(), Outcome::NotPermitted);
        assert_eq!(session.current_index().get(), 0);

        session.select_current(1);
        assert!(session.can_go_next());
        assert_eq!(session.go_next(), Outcome::Applied);
    }

    #[test]
    fn test_jump_ignores_answer_gate() {
        let mut session = abc_quiz(3);

        assert_eq!(session.current_answer(), None);
        assert_eq!(session.go_to_question(idx(&session, 2)), Outcome::Applied);
        assert_eq!(session.current_index().get(), 2);
    }

    #[test]
    fn test_selection_survives_navigation() {
        let mut session = abc_quiz(3);

        session.select_current(2);
        session.go_next();
        session.go_previous();
        assert_eq!(session.current_answer(), Some(2));

        // Reselecting overwrites.
        session.select_current(0);
        assert_eq!(session.answer(idx(&session, 0)), Some(0));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn test_select_rejects_out_of_range_option() {
        let mut session = abc_quiz(1);
        assert_eq!(session.select_current(3), Outcome::NotPermitted);
        assert_eq!(session.current_answer(), None);
    }

    #[test]
    fn test_finish_requires_last_question_and_all_answers() {
        let mut session = abc_quiz(2);

        session.select_current(1);
        assert_eq!(session.finish(), Outcome::NotPermitted);

        session.go_next();
        assert!(!session.can_finish());
        session.select_current(1);
        assert!(session.can_finish());
        assert_eq!(session.finish(), Outcome::Applied);
        assert_eq!(session.finish_reason(), Some(FinishReason::Submitted));
    }

    #[test]
    fn test_finished_session_rejects_everything() {
        let mut session = abc_quiz(1);
        session.select_current(1);
        session.finish();

        assert_eq!(session.select_current(0), Outcome::NotPermitted);
        assert_eq!(session.go_previous(), Outcome::NotPermitted);
        assert_eq!(session.go_to_question(idx(&session, 0)), Outcome::NotPermitted);
        assert_eq!(session.finish(), Outcome::NotPermitted);
        assert_eq!(session.tick(), TickOutcome::Stopped);
        assert_eq!(session.remaining_secs(), TIME_BUDGET_SECS);
        assert!(session.is_finished());
    }

    #[test]
    fn test_timeout_scores_only_answered_questions() {
        let mut session = abc_quiz(3);

        session.select_option(idx(&session, 0), 1);
        session.select_option(idx(&session, 1), 0);

        assert_eq!(run_out_the_clock(&mut session), TickOutcome::TimedOut);
        assert!(session.is_finished());
        assert_eq!(session.finish_reason(), Some(FinishReason::TimedOut));

        let result = session.result().unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.percentage, 33);
        assert_eq!(result.answered, 2);
        assert_eq!(result.time_used_secs, TIME_BUDGET_SECS);
    }

    #[test]
    fn test_unresolved_answer_is_never_correct() {
        let questions = vec![Question {
            text: "Capital of France?".to_string(),
            options: vec![
                "London".to_string(),
                "Berlin".to_string(),
                "Madrid".to_string(),
            ],
            correct_index: None,
        }];

        for choice in 0..3 {
            let mut session = QuizSession::new(questions.clone()).unwrap();
            session.select_current(choice);
            session.finish();
            assert_eq!(session.result().unwrap().score, 0);
        }
    }

    #[test]
    fn test_result_is_none_while_running() {
        let session = abc_quiz(1);
        assert!(session.result().is_none());
    }

    #[test]
    fn test_reveal_only_after_finish() {
        let mut session = abc_quiz(1);
        assert!(!session.reveal());

        session.select_current(1);
        session.finish();
        assert!(session.reveal());
        assert!(session.is_revealed());
        assert!(!session.reveal());
    }

    #[test]
    fn test_restart_is_a_new_session() {
        let mut session = abc_quiz(2);
        session.select_current(1);
        run_out_the_clock(&mut session);

        let fresh = session.restart();
        assert_ne!(fresh.id(), session.id());
        assert!(fresh.is_in_progress());
        assert_eq!(fresh.answered_count(), 0);
        assert_eq!(fresh.remaining_secs(), TIME_BUDGET_SECS);
        assert!(session.is_finished());
    }

    #[test]
    fn test_index_bounds() {
        let session = abc_quiz(2);
        assert!(session.index(1).is_some());
        assert!(session.index(2).is_none());
        assert_eq!(session.indices().count(), 2);
    }
}
