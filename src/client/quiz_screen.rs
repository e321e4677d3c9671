//! Quiz-taking screen: a session plus the timers that drive it.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Question;
use crate::quiz::{
    Outcome, QuizSession, TickOutcome, Timer, REVEAL_DELAY, TICK_INTERVAL,
};

use super::state::AppEvent;

/// The screen owns its session and timers. Dropping it stops both timers.
pub struct QuizScreen {
    /// `None` when the quiz arrived without questions.
    session: Option<QuizSession>,
    countdown: Option<Timer>,
    reveal: Option<Timer>,
    /// Highlighted option on the current question.
    cursor: usize,
    review_scroll: u16,
    events: UnboundedSender<AppEvent>,
}

impl QuizScreen {
    /// Start a fresh attempt and its countdown.
    pub fn start(questions: Vec<Question>, events: UnboundedSender<AppEvent>) -> Self {
        let mut screen = Self {
            session: QuizSession::new(questions),
            countdown: None,
            reveal: None,
            cursor: 0,
            review_scroll: 0,
            events,
        };
        screen.start_countdown();
        screen
    }

    fn start_countdown(&mut self) {
        self.reveal = None;
        self.countdown = self.session.as_ref().map(|session| {
            let id = session.id();
            info!(session = %id, questions = session.len(), "quiz started");
            Timer::repeating(TICK_INTERVAL, self.events.clone(), move || AppEvent::Tick {
                session: id,
            })
        });
    }

    /// Stop counting and schedule the reveal of the results.
    fn on_finished(&mut self) {
        self.countdown = None;
        if let Some(session) = &self.session {
            let id = session.id();
            if let Some(result) = session.result() {
                info!(
                    session = %id,
                    score = result.score,
                    total = result.total,
                    reason = ?result.reason,
                    "quiz finished"
                );
            }
            self.reveal = Some(Timer::once(
                REVEAL_DELAY,
                self.events.clone(),
                AppEvent::Reveal { session: id },
            ));
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn review_scroll(&self) -> u16 {
        self.review_scroll
    }

    pub fn is_counting(&self) -> bool {
        self.countdown.as_ref().is_some_and(Timer::is_active)
    }

    /// Apply a countdown tick. Ticks for another session are ignored.
    pub fn on_tick(&mut self, session_id: Uuid) -> Option<TickOutcome> {
        let session = self.session.as_mut().filter(|s| s.id() == session_id)?;
        let outcome = session.tick();
        match outcome {
            TickOutcome::TimedOut => self.on_finished(),
            TickOutcome::Stopped => self.countdown = None,
            TickOutcome::Counting { .. } => {}
        }
        Some(outcome)
    }

    /// Reveal results once the delay has passed.
    pub fn on_reveal(&mut self, session_id: Uuid) -> bool {
        self.reveal = None;
        match self.session.as_mut() {
            Some(session) if session.id() == session_id => session.reveal(),
            _ => {
                debug!(session = %session_id, "stale reveal ignored");
                false
            }
        }
    }

    fn option_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |s| s.current_question().options.len())
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.option_count() {
            self.cursor += 1;
        }
    }

    /// Answer the current question with the highlighted option.
    pub fn select(&mut self) -> Outcome {
        let cursor = self.cursor;
        self.session
            .as_mut()
            .map_or(Outcome::NotPermitted, |s| s.select_current(cursor))
    }

    /// Put the cursor on the current question's answer, if any.
    fn sync_cursor(&mut self) {
        self.cursor = self
            .session
            .as_ref()
            .and_then(QuizSession::current_answer)
            .unwrap_or(0);
    }

    pub fn next(&mut self) -> Outcome {
        let outcome = self.session.as_mut().map_or(Outcome::NotPermitted, QuizSession::go_next);
        self.sync_cursor();
        outcome
    }

    pub fn previous(&mut self) -> Outcome {
        let outcome = self
            .session
            .as_mut()
            .map_or(Outcome::NotPermitted, QuizSession::go_previous);
        self.sync_cursor();
        outcome
    }

    /// Jump to a question by 0-based position.
    pub fn jump(&mut self, position: usize) -> Outcome {
        let Some(session) = self.session.as_mut() else {
            return Outcome::NotPermitted;
        };
        let Some(index) = session.index(position) else {
            return Outcome::NotPermitted;
        };
        let outcome = session.go_to_question(index);
        self.sync_cursor();
        outcome
    }

    /// Step through the question strip, wrapping at either end. Like
    /// [`jump`](Self::jump) this ignores whether questions are answered.
    pub fn jump_by(&mut self, forward: bool) -> Outcome {
        let Some(session) = self.session.as_ref() else {
            return Outcome::NotPermitted;
        };
        let len = session.len();
        let current = session.current_index().get();
        let target = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.jump(target)
    }

    pub fn finish(&mut self) -> Outcome {
        let outcome = self.session.as_mut().map_or(Outcome::NotPermitted, QuizSession::finish);
        if outcome == Outcome::Applied {
            self.on_finished();
        }
        outcome
    }

    /// Try again with the same questions.
    pub fn restart(&mut self) {
        if let Some(session) = &self.session {
            self.session = Some(session.restart());
            self.cursor = 0;
            self.review_scroll = 0;
            self.start_countdown();
        }
    }

    pub fn scroll_review_down(&mut self) {
        self.review_scroll = self.review_scroll.saturating_add(1);
    }

    pub fn scroll_review_up(&mut self) {
        self.review_scroll = self.review_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{FinishReason, Phase, TIME_BUDGET_SECS};
    use tokio::sync::mpsc;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                text: format!("Question {}", i + 1),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_index: Some(1),
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_times_out_and_reveals() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = QuizScreen::start(questions(3), tx);

        assert_eq!(screen.select(), Outcome::Applied);
        screen.cursor_down();
        assert_eq!(screen.jump(1), Outcome::Applied);
        assert_eq!(screen.select(), Outcome::Applied);

        let mut ticks = 0;
        loop {
            match rx.recv().await.unwrap() {
                AppEvent::Tick { session } => {
                    ticks += 1;
                    screen.on_tick(session);
                }
                AppEvent::Reveal { session } => {
                    assert!(screen.on_reveal(session));
                    break;
                }
                _ => unreachable!(),
            }
        }

        assert_eq!(ticks, TIME_BUDGET_SECS);
        let session = screen.session().unwrap();
        assert_eq!(session.phase(), Phase::Revealed);

        let result = session.result().unwrap();
        assert_eq!(result.reason, FinishReason::TimedOut);
        assert_eq!(result.answered, 2);
        assert!(!screen.is_counting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_ignores_stale_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = QuizScreen::start(questions(2), tx);
        let first = screen.session().unwrap().id();

        let AppEvent::Tick { session } = rx.recv().await.unwrap() else {
            panic!("expected a tick");
        };
        assert_eq!(session, first);
        screen.on_tick(session);

        screen.restart();
        assert_ne!(screen.session().unwrap().id(), first);
        assert_eq!(screen.on_tick(first), None);
        assert_eq!(screen.session().unwrap().remaining_secs(), TIME_BUDGET_SECS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_schedules_reveal() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = QuizScreen::start(questions(1), tx);

        assert_eq!(screen.finish(), Outcome::NotPermitted);
        screen.select();
        assert_eq!(screen.finish(), Outcome::Applied);
        assert!(!screen.is_counting());

        // Only the reveal arrives; the countdown is gone.
        match rx.recv().await.unwrap() {
            AppEvent::Reveal { session } => assert!(screen.on_reveal(session)),
            _ => panic!("expected the reveal"),
        }
        assert!(screen.session().unwrap().is_revealed());
    }

    #[tokio::test]
    async fn test_cursor_follows_answers() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = QuizScreen::start(questions(2), tx);

        screen.cursor_down();
        screen.cursor_down();
        screen.cursor_down();
        assert_eq!(screen.cursor(), 2);
        screen.select();

        assert_eq!(screen.next(), Outcome::Applied);
        assert_eq!(screen.cursor(), 0);
        assert_eq!(screen.previous(), Outcome::Applied);
        assert_eq!(screen.cursor(), 2);
    }

    #[tokio::test]
    async fn test_strip_reaches_every_question_unanswered() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = QuizScreen::start(questions(12), tx);

        for _ in 0..11 {
            assert_eq!(screen.jump_by(true), Outcome::Applied);
        }
        let session = screen.session().unwrap();
        assert_eq!(session.current_index().number(), 12);
        assert_eq!(session.answered_count(), 0);

        assert_eq!(screen.jump_by(true), Outcome::Applied);
        assert_eq!(screen.session().unwrap().current_index().get(), 0);
        assert_eq!(screen.jump_by(false), Outcome::Applied);
        assert_eq!(screen.session().unwrap().current_index().get(), 11);
    }

    #[tokio::test]
    async fn test_empty_quiz_is_a_placeholder() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = QuizScreen::start(Vec::new(), tx);

        assert!(screen.session().is_none());
        assert!(!screen.is_counting());
        assert_eq!(screen.select(), Outcome::NotPermitted);
        assert_eq!(screen.jump(0), Outcome::NotPermitted);
        assert_eq!(screen.jump_by(true), Outcome::NotPermitted);
    }
}
