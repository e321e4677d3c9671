//! Client state management.

use std::io;
use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::Question;
use crate::protocol::{
    ChatMessage, DocType, ProcessResponse, QuizLevel, SummaryLength, SummaryResponse,
    DEFAULT_QUESTIONS, HISTORY_WINDOW,
};

use super::api::{summary_path, ApiClient, DocumentUpload};
use super::quiz_screen::QuizScreen;

/// Most questions the upload form lets you ask for.
pub const MAX_FORM_QUESTIONS: u32 = 20;

/// Average reading speed used for the summary's reading time.
pub const WORDS_PER_MINUTE: usize = 200;

/// Everything the UI loop reacts to besides key presses.
#[derive(Debug)]
pub enum AppEvent {
    Tick { session: Uuid },
    Reveal { session: Uuid },
    QuizReady(Result<Vec<Question>, String>),
    SummaryReady(Result<SummaryResponse, String>),
    DocumentReady(Result<ProcessResponse, String>),
    Answer {
        chat: Uuid,
        answer: Result<String, String>,
    },
}

/// What the user wants to do with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Quiz,
    Summary,
    Chat,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Quiz, Mode::Summary, Mode::Chat];

    pub fn title(self) -> &'static str {
        match self {
            Mode::Quiz => "Generate Quiz",
            Mode::Summary => "Summarize Document",
            Mode::Chat => "Ask Questions",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Quiz => "Multiple-choice questions drawn from your document",
            Mode::Summary => "A short, medium or detailed summary",
            Mode::Chat => "Chat with an assistant that has read the document",
        }
    }
}

/// Steps of the upload wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    File,
    DocType,
    Settings,
}

impl WizardStep {
    pub fn number(self) -> usize {
        match self {
            WizardStep::File => 1,
            WizardStep::DocType => 2,
            WizardStep::Settings => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::File => "Upload",
            WizardStep::DocType => "Document Type",
            WizardStep::Settings => "Configure",
        }
    }
}

/// Which quiz setting has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizField {
    Count,
    Level,
}

/// A request the wizard is ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRequest {
    Quiz {
        upload: DocumentUpload,
        num_questions: u32,
        level: QuizLevel,
    },
    Summary {
        upload: DocumentUpload,
        length: SummaryLength,
    },
    Process {
        upload: DocumentUpload,
    },
}

#[derive(Debug, Clone)]
pub struct UploadWizard {
    pub mode: Mode,
    pub step: WizardStep,
    pub path_input: String,
    pub doc_type: DocType,
    pub quiz_field: QuizField,
    pub num_questions: u32,
    pub level: QuizLevel,
    pub length: SummaryLength,
    pub loading: bool,
    pub error: Option<String>,
}

impl UploadWizard {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            step: WizardStep::File,
            path_input: String::new(),
            doc_type: DocType::Pdf,
            quiz_field: QuizField::Count,
            num_questions: DEFAULT_QUESTIONS,
            level: QuizLevel::default(),
            length: SummaryLength::default(),
            loading: false,
            error: None,
        }
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.path_input.trim())
    }

    pub fn upload(&self) -> DocumentUpload {
        DocumentUpload {
            path: self.path(),
            doc_type: self.doc_type,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if self.step == WizardStep::File && !self.loading {
            self.path_input.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if self.step == WizardStep::File && !self.loading {
            self.path_input.pop();
            self.error = None;
        }
    }

    /// Handle Enter. Returns a request once the last step is confirmed.
    pub fn advance(&mut self) -> Option<UploadRequest> {
        if self.loading {
            return None;
        }

        match self.step {
            WizardStep::File => {
                let path = self.path();
                if self.path_input.trim().is_empty() {
                    self.error = Some("Please enter a file path.".to_string());
                } else if !path.is_file() {
                    self.error = Some(format!("File not found: {}", path.display()));
                } else {
                    if let Some(guess) = path.to_str().and_then(DocType::from_file_name) {
                        self.doc_type = guess;
                    }
                    self.error = None;
                    self.step = WizardStep::DocType;
                }
                None
            }
            WizardStep::DocType if self.mode == Mode::Chat => Some(self.begin()),
            WizardStep::DocType => {
                self.step = WizardStep::Settings;
                None
            }
            WizardStep::Settings => Some(self.begin()),
        }
    }

    fn begin(&mut self) -> UploadRequest {
        self.loading = true;
        self.error = None;
        let upload = self.upload();
        match self.mode {
            Mode::Quiz => UploadRequest::Quiz {
                upload,
                num_questions: self.num_questions,
                level: self.level,
            },
            Mode::Summary => UploadRequest::Summary {
                upload,
                length: self.length,
            },
            Mode::Chat => UploadRequest::Process { upload },
        }
    }

    /// Step back. Returns false when already on the first step.
    pub fn back(&mut self) -> bool {
        if self.loading {
            return true;
        }
        self.error = None;
        match self.step {
            WizardStep::File => false,
            WizardStep::DocType => {
                self.step = WizardStep::File;
                true
            }
            WizardStep::Settings => {
                self.step = WizardStep::DocType;
                true
            }
        }
    }

    /// Up/down: move between choices on the current step.
    pub fn cycle(&mut self, forward: bool) {
        if self.loading {
            return;
        }
        match self.step {
            WizardStep::File => {}
            WizardStep::DocType => self.doc_type = cycle(&DocType::ALL, self.doc_type, forward),
            WizardStep::Settings => match self.mode {
                Mode::Quiz => {
                    self.quiz_field = match self.quiz_field {
                        QuizField::Count => QuizField::Level,
                        QuizField::Level => QuizField::Count,
                    }
                }
                Mode::Summary => self.length = cycle(&SummaryLength::ALL, self.length, forward),
                Mode::Chat => {}
            },
        }
    }

    /// Left/right: change the focused quiz setting.
    pub fn adjust(&mut self, increase: bool) {
        if self.loading || self.step != WizardStep::Settings {
            return;
        }
        match (self.mode, self.quiz_field) {
            (Mode::Quiz, QuizField::Count) => {
                self.num_questions = if increase {
                    (self.num_questions + 1).min(MAX_FORM_QUESTIONS)
                } else {
                    self.num_questions.saturating_sub(1).max(1)
                };
            }
            (Mode::Quiz, QuizField::Level) => {
                self.level = cycle(&QuizLevel::ALL, self.level, increase)
            }
            (Mode::Summary, _) => self.length = cycle(&SummaryLength::ALL, self.length, increase),
            (Mode::Chat, _) => {}
        }
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let position = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (position + 1) % len
    } else {
        (position + len - 1) % len
    };
    all[next]
}

#[derive(Debug, Clone)]
pub struct SummaryView {
    pub file_name: String,
    pub content: String,
    pub document: PathBuf,
    pub scroll: u16,
    pub status: Option<String>,
}

impl SummaryView {
    pub fn new(response: SummaryResponse, document: PathBuf) -> Self {
        Self {
            file_name: response.file_name,
            content: response.content,
            document,
            scroll: 0,
            status: None,
        }
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.content)
    }

    pub fn reading_minutes(&self) -> usize {
        reading_minutes(self.word_count())
    }

    /// Write the summary next to the document.
    pub fn save(&mut self) -> io::Result<PathBuf> {
        let path = summary_path(&self.document, &self.file_name);
        match std::fs::write(&path, &self.content) {
            Ok(()) => {
                info!(path = %path.display(), "summary saved");
                self.status = Some(format!("Saved to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to save summary");
                self.status = Some(format!("Error: {}", e));
                Err(e)
            }
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read `words`, rounded up.
pub fn reading_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

#[derive(Debug, Clone)]
pub struct ChatView {
    /// Tags answers so one sent from an earlier chat is never shown here.
    id: Uuid,
    pub doc_id: String,
    pub file_name: String,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    /// An answer is on its way; input is disabled.
    pub waiting: bool,
}

impl ChatView {
    pub fn new(document: ProcessResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            doc_id: document.doc_id,
            file_name: document.file_name,
            messages: Vec::new(),
            input: String::new(),
            waiting: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_char(&mut self, c: char) {
        if !self.waiting {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if !self.waiting {
            self.input.pop();
        }
    }

    /// Take the typed question. Returns it with the history that precedes it.
    pub fn send(&mut self) -> Option<(String, Vec<ChatMessage>)> {
        if self.waiting || self.input.trim().is_empty() {
            return None;
        }

        let skip = self.messages.len().saturating_sub(HISTORY_WINDOW);
        let history = self.messages[skip..].to_vec();
        let question = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(question.clone()));
        self.waiting = true;
        Some((question, history))
    }

    pub fn receive(&mut self, answer: Result<String, String>) {
        if !self.waiting {
            return;
        }
        self.waiting = false;
        let content = match answer {
            Ok(answer) => answer,
            Err(message) => format!("Sorry, I encountered an error: {}", message),
        };
        self.messages.push(ChatMessage::ai(content));
    }
}

pub enum Screen {
    Landing { selected: usize },
    Upload(UploadWizard),
    Quiz(QuizScreen),
    Summary(SummaryView),
    Chat(ChatView),
}

/// Owns all client state. Only the UI loop mutates it.
pub struct ClientApp {
    pub screen: Screen,
    pub should_quit: bool,
    /// `None` when playing a question file offline.
    api: Option<ApiClient>,
    events: UnboundedSender<AppEvent>,
}

impl ClientApp {
    pub fn new(api: ApiClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            screen: Screen::Landing { selected: 0 },
            should_quit: false,
            api: Some(api),
            events,
        }
    }

    /// Straight into a quiz, with no server behind it.
    pub fn offline(questions: Vec<Question>, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            screen: Screen::Quiz(QuizScreen::start(questions, events.clone())),
            should_quit: false,
            api: None,
            events,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.api.is_none()
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api.as_ref().map(ApiClient::base_url)
    }

    pub fn go_home(&mut self) {
        if self.is_offline() {
            self.should_quit = true;
        } else {
            self.screen = Screen::Landing { selected: 0 };
        }
    }

    pub fn open_mode(&mut self, mode: Mode) {
        self.screen = Screen::Upload(UploadWizard::new(mode));
    }

    /// Leave the quiz. Online this returns to the upload form.
    pub fn exit_quiz(&mut self) {
        if self.is_offline() {
            self.should_quit = true;
        } else {
            self.open_mode(Mode::Quiz);
        }
    }

    /// Send a wizard request in the background. The result comes back as an
    /// [`AppEvent`].
    pub fn dispatch(&self, request: UploadRequest) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match request {
                UploadRequest::Quiz {
                    upload,
                    num_questions,
                    level,
                } => AppEvent::QuizReady(
                    api.generate_quiz(&upload, num_questions, level)
                        .await
                        .map_err(|e| e.to_string()),
                ),
                UploadRequest::Summary { upload, length } => AppEvent::SummaryReady(
                    api.summarize(&upload, length).await.map_err(|e| e.to_string()),
                ),
                UploadRequest::Process { upload } => AppEvent::DocumentReady(
                    api.process(&upload).await.map_err(|e| e.to_string()),
                ),
            };
            let _ = events.send(event);
        });
    }

    pub fn dispatch_question(
        &self,
        chat: Uuid,
        doc_id: String,
        question: String,
        history: Vec<ChatMessage>,
    ) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let events = self.events.clone();
        tokio::spawn(async move {
            let answer = api
                .ask(&doc_id, &question, &history)
                .await
                .map_err(|e| e.to_string());
            let _ = events.send(AppEvent::Answer { chat, answer });
        });
    }

    /// Apply one event. Results for a screen the user already left are dropped.
    pub fn handle_event(&mut self, event: AppEvent) {
        match (event, &mut self.screen) {
            (AppEvent::Tick { session }, Screen::Quiz(quiz)) => {
                quiz.on_tick(session);
            }
            (AppEvent::Reveal { session }, Screen::Quiz(quiz)) => {
                quiz.on_reveal(session);
            }
            (AppEvent::QuizReady(result), Screen::Upload(wizard)) if awaiting(wizard, Mode::Quiz) => {
                match result {
                    Ok(questions) if questions.is_empty() => {
                        wizard.fail("The server returned no questions.".to_string())
                    }
                    Ok(questions) => {
                        info!(count = questions.len(), "quiz received");
                        self.screen = Screen::Quiz(QuizScreen::start(questions, self.events.clone()));
                    }
                    Err(message) => wizard.fail(message),
                }
            }
            (AppEvent::SummaryReady(result), Screen::Upload(wizard))
                if awaiting(wizard, Mode::Summary) =>
            {
                match result {
                    Ok(summary) => {
                        let document = wizard.path();
                        self.screen = Screen::Summary(SummaryView::new(summary, document));
                    }
                    Err(message) => wizard.fail(message),
                }
            }
            (AppEvent::DocumentReady(result), Screen::Upload(wizard))
                if awaiting(wizard, Mode::Chat) =>
            {
                match result {
                    Ok(document) => self.screen = Screen::Chat(ChatView::new(document)),
                    Err(message) => wizard.fail(message),
                }
            }
            (AppEvent::Answer { chat: id, answer }, Screen::Chat(chat)) if id == chat.id() => {
                chat.receive(answer)
            }
            (event, _) => {
                debug!(?event, "event ignored on this screen");
            }
        }
    }
}

fn awaiting(wizard: &UploadWizard, mode: Mode) -> bool {
    wizard.loading && wizard.mode == mode
}
