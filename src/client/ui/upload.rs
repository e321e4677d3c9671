//! Upload wizard: file, document type, then settings.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{Mode, QuizField, UploadWizard, WizardStep};
use crate::protocol::{DocType, QuizLevel, SummaryLength};

pub fn render(frame: &mut Frame, area: Rect, wizard: &UploadWizard) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Steps
        Constraint::Min(8),    // Current step
        Constraint::Length(3), // Status
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_steps(frame, chunks[0], wizard);
    match wizard.step {
        WizardStep::File => render_file(frame, chunks[1], wizard),
        WizardStep::DocType => render_doc_type(frame, chunks[1], wizard),
        WizardStep::Settings => render_settings(frame, chunks[1], wizard),
    }
    render_status(frame, chunks[2], wizard);
    render_controls(frame, chunks[3], wizard.step);
}

fn render_steps(frame: &mut Frame, area: Rect, wizard: &UploadWizard) {
    let mut spans = vec![Span::styled(
        format!("{}  ", wizard.mode.title()),
        Style::default().fg(Color::Cyan).bold(),
    )];

    let steps: &[WizardStep] = if wizard.mode == Mode::Chat {
        &[WizardStep::File, WizardStep::DocType]
    } else {
        &[WizardStep::File, WizardStep::DocType, WizardStep::Settings]
    };
    for step in steps {
        let style = if *step == wizard.step {
            Style::default().fg(Color::Yellow).bold()
        } else if step.number() < wizard.step.number() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" {}. {} ", step.number(), step.title()),
            style,
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn step_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::new(2, 2, 1, 0))
}

fn render_file(frame: &mut Frame, area: Rect, wizard: &UploadWizard) {
    let lines = vec![
        Line::from(Span::styled(
            "Path to a PDF, DOCX or image file:",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::styled(wizard.path_input.clone(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
    ];

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(step_block(" Choose a document "));
    frame.render_widget(widget, area);
}

fn render_doc_type(frame: &mut Frame, area: Rect, wizard: &UploadWizard) {
    let lines: Vec<Line> = DocType::ALL
        .iter()
        .map(|doc_type| {
            choice_line(*doc_type == wizard.doc_type, doc_type.label())
        })
        .collect();

    let widget = Paragraph::new(lines).block(step_block(" Document type "));
    frame.render_widget(widget, area);
}

fn render_settings(frame: &mut Frame, area: Rect, wizard: &UploadWizard) {
    let lines = match wizard.mode {
        Mode::Quiz => {
            let focus = |field| {
                if wizard.quiz_field == field {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                }
            };
            let levels: Vec<Span> = QuizLevel::ALL
                .iter()
                .map(|level| option_span(*level == wizard.level, level.as_str()))
                .collect();

            vec![
                Line::from(vec![
                    Span::styled("Number of questions:  ", focus(QuizField::Count)),
                    Span::styled(
                        format!("< {} >", wizard.num_questions),
                        Style::default().fg(Color::Cyan).bold(),
                    ),
                ]),
                Line::from(""),
                Line::from(
                    std::iter::once(Span::styled("Difficulty level:     ", focus(QuizField::Level)))
                        .chain(levels)
                        .collect::<Vec<_>>(),
                ),
            ]
        }
        Mode::Summary => SummaryLength::ALL
            .iter()
            .map(|length| choice_line(*length == wizard.length, length.as_str()))
            .collect(),
        Mode::Chat => Vec::new(),
    };

    let title = match wizard.mode {
        Mode::Summary => " Summary length ",
        _ => " Quiz settings ",
    };
    let widget = Paragraph::new(lines).block(step_block(title));
    frame.render_widget(widget, area);
}

fn choice_line(selected: bool, label: &str) -> Line<'static> {
    let (prefix, style) = if selected {
        ("(*) ", Style::default().fg(Color::Yellow).bold())
    } else {
        ("( ) ", Style::default().fg(Color::White))
    };
    Line::from(Span::styled(format!("{}{}", prefix, label), style))
}

fn option_span(selected: bool, label: &str) -> Span<'static> {
    if selected {
        Span::styled(format!("[{}] ", label), Style::default().fg(Color::Cyan).bold())
    } else {
        Span::styled(format!(" {}  ", label), Style::default().fg(Color::DarkGray))
    }
}

fn render_status(frame: &mut Frame, area: Rect, wizard: &UploadWizard) {
    let line = if wizard.loading {
        let message = match wizard.mode {
            Mode::Quiz => "Generating quiz...",
            Mode::Summary => "Generating summary...",
            Mode::Chat => "Processing document...",
        };
        Line::from(Span::styled(message, Style::default().fg(Color::Yellow)))
    } else if let Some(error) = &wizard.error {
        Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red).bold(),
        ))
    } else {
        Line::from("")
    };

    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, step: WizardStep) {
    let text = match step {
        WizardStep::File => "type a path  ·  Enter continue  ·  Esc back",
        WizardStep::DocType => "j/k or arrows to choose  ·  Enter continue  ·  Esc back",
        WizardStep::Settings => "j/k switch  ·  h/l or arrows change  ·  Enter generate  ·  Esc back",
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
