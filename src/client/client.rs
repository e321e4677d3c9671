//! Terminal client: event loop and key handling.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use uuid::Uuid;

use crate::config::ClientSettings;
use crate::models::Question;
use crate::protocol::ChatMessage;
use crate::terminal::{self, AppTerminal};

use super::api::ApiClient;
use super::state::{AppEvent, ClientApp, Mode, Screen, UploadRequest, WizardStep};
use super::ui;

/// How long to wait for a key before checking the event channel again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the client against the API server.
pub async fn run(settings: &ClientSettings) -> io::Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let api = ApiClient::new(&settings.api_url);
    info!(api = api.base_url(), "starting client");
    run_tui(ClientApp::new(api, tx), rx).await
}

/// Play a list of questions without a server.
pub async fn play(questions: Vec<Question>) -> io::Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    info!(questions = questions.len(), "starting offline quiz");
    run_tui(ClientApp::offline(questions, tx), rx).await
}

async fn run_tui(mut app: ClientApp, mut events: UnboundedReceiver<AppEvent>) -> io::Result<()> {
    let mut terminal = terminal::init()?;
    let result = event_loop(&mut terminal, &mut app, &mut events);
    terminal::restore()?;
    result
}

fn event_loop(
    terminal: &mut AppTerminal,
    app: &mut ClientApp,
    events: &mut UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }
    }
    Ok(())
}

/// What a key press asks of the app as a whole.
enum Action {
    None,
    Quit,
    Home,
    Open(Mode),
    Upload(UploadRequest),
    Ask {
        chat: Uuid,
        doc_id: String,
        question: String,
        history: Vec<ChatMessage>,
    },
    ExitQuiz,
}

fn handle_key(app: &mut ClientApp, key: KeyEvent) {
    let action = if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        Action::Quit
    } else {
        match &mut app.screen {
            Screen::Landing { selected } => landing_key(selected, key.code),
            Screen::Upload(wizard) => match key.code {
                KeyCode::Esc => {
                    if wizard.back() {
                        Action::None
                    } else {
                        Action::Home
                    }
                }
                KeyCode::Enter => wizard.advance().map_or(Action::None, Action::Upload),
                KeyCode::Backspace => {
                    wizard.backspace();
                    Action::None
                }
                KeyCode::Char(c) if wizard.step == WizardStep::File => {
                    wizard.input_char(c);
                    Action::None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    wizard.cycle(false);
                    Action::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    wizard.cycle(true);
                    Action::None
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    wizard.adjust(false);
                    Action::None
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    wizard.adjust(true);
                    Action::None
                }
                _ => Action::None,
            },
            Screen::Quiz(quiz) => quiz_key(quiz, key.code),
            Screen::Summary(summary) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    summary.scroll = summary.scroll.saturating_add(1);
                    Action::None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    summary.scroll = summary.scroll.saturating_sub(1);
                    Action::None
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    let _ = summary.save();
                    Action::None
                }
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Home,
                _ => Action::None,
            },
            Screen::Chat(chat) => match key.code {
                KeyCode::Esc => Action::Home,
                KeyCode::Enter => match chat.send() {
                    Some((question, history)) => Action::Ask {
                        chat: chat.id(),
                        doc_id: chat.doc_id.clone(),
                        question,
                        history,
                    },
                    None => Action::None,
                },
                KeyCode::Backspace => {
                    chat.backspace();
                    Action::None
                }
                KeyCode::Char(c) => {
                    chat.input_char(c);
                    Action::None
                }
                _ => Action::None,
            },
        }
    };

    match action {
        Action::None => {}
        Action::Quit => app.should_quit = true,
        Action::Home => app.go_home(),
        Action::Open(mode) => app.open_mode(mode),
        Action::Upload(request) => app.dispatch(request),
        Action::Ask {
            chat,
            doc_id,
            question,
            history,
        } => app.dispatch_question(chat, doc_id, question, history),
        Action::ExitQuiz => app.exit_quiz(),
    }
}

fn landing_key(selected: &mut usize, key: KeyCode) -> Action {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            *selected = selected.saturating_sub(1);
            Action::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if *selected + 1 < Mode::ALL.len() {
                *selected += 1;
            }
            Action::None
        }
        KeyCode::Enter => Action::Open(Mode::ALL[*selected]),
        KeyCode::Char(c @ '1'..='3') => {
            let position = c as usize - '1' as usize;
            Action::Open(Mode::ALL[position])
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

fn quiz_key(quiz: &mut super::quiz_screen::QuizScreen, key: KeyCode) -> Action {
    let Some(session) = quiz.session() else {
        return match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::ExitQuiz,
            _ => Action::None,
        };
    };

    if session.is_in_progress() {
        match key {
            KeyCode::Up | KeyCode::Char('k') => quiz.cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => quiz.cursor_down(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                quiz.select();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                quiz.previous();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                quiz.next();
            }
            KeyCode::Char(c @ '1'..='9') => {
                quiz.jump(c as usize - '1' as usize);
            }
            KeyCode::Tab => {
                quiz.jump_by(true);
            }
            KeyCode::BackTab => {
                quiz.jump_by(false);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                quiz.finish();
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Action::ExitQuiz,
            _ => {}
        }
        return Action::None;
    }

    match key {
        KeyCode::Down | KeyCode::Char('j') => quiz.scroll_review_down(),
        KeyCode::Up | KeyCode::Char('k') => quiz.scroll_review_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => quiz.restart(),
        KeyCode::Char('h') | KeyCode::Char('H') => return Action::Home,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Action::ExitQuiz,
        _ => {}
    }
    Action::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut ClientApp, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_landing_navigation() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = ClientApp::new(ApiClient::new("http://localhost:8000"), tx);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        let Screen::Upload(wizard) = &app.screen else {
            panic!("expected the upload wizard");
        };
        assert_eq!(wizard.mode, Mode::Summary);

        // 'q' is text on the file step, Esc goes home.
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::Landing { .. }));

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_offline_quiz_keys() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let questions = vec![
            Question {
                text: "First".into(),
                options: vec!["a".into(), "b".into()],
                correct_index: Some(0),
            },
            Question {
                text: "Second".into(),
                options: vec!["a".into(), "b".into()],
                correct_index: Some(1),
            },
        ];
        let mut app = ClientApp::offline(questions, tx);

        // Next is gated on an answer; a direct jump is not.
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('f'));

        let Screen::Quiz(quiz) = &app.screen else {
            panic!("expected the quiz");
        };
        let result = quiz.session().unwrap().result().unwrap();
        assert_eq!(result.score, 2);

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_tab_reaches_late_questions() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let questions = (1..=12)
            .map(|n| Question {
                text: format!("Question {}", n),
                options: vec!["a".into(), "b".into()],
                correct_index: Some(0),
            })
            .collect();
        let mut app = ClientApp::offline(questions, tx);

        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);

        let Screen::Quiz(quiz) = &app.screen else {
            panic!("expected the quiz");
        };
        let session = quiz.session().unwrap();
        assert_eq!(session.current_question().text, "Question 12");
        assert_eq!(session.answered_count(), 0);

        press(&mut app, KeyCode::BackTab);
        let Screen::Quiz(quiz) = &app.screen else {
            panic!("expected the quiz");
        };
        assert_eq!(quiz.session().unwrap().current_index().number(), 11);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_anywhere() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = ClientApp::new(ApiClient::new("http://localhost:8000"), tx);
        app.open_mode(Mode::Chat);

        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
