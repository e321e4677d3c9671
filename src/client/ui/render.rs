//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::client::state::{ClientApp, Screen};

use super::{chat, landing, quiz, results, summary, upload};

/// Render the client UI based on the current screen.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Landing { selected } => landing::render(frame, area, *selected, app.api_url()),
        Screen::Upload(wizard) => upload::render(frame, area, wizard),
        Screen::Quiz(screen) => match screen.session() {
            None => render_placeholder(frame, area),
            Some(session) if session.is_revealed() => {
                results::render(frame, area, session, screen.review_scroll())
            }
            Some(session) if session.is_finished() => render_calculating(frame, area),
            Some(session) => quiz::render(frame, area, session, screen.cursor()),
        },
        Screen::Summary(view) => summary::render(frame, area, view),
        Screen::Chat(view) => chat::render(frame, area, view),
    }
}

/// Centered block of lines in the middle of the screen.
pub(super) fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = lines.len() as u16;
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(height),
        Constraint::Percentage(40),
    ])
    .split(area);

    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn render_placeholder(frame: &mut Frame, area: Rect) {
    render_centered(
        frame,
        area,
        vec![
            Line::from(Span::styled(
                "No questions to show",
                Style::default().fg(Color::Yellow).bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press [Q] to exit",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    );
}

fn render_calculating(frame: &mut Frame, area: Rect) {
    render_centered(
        frame,
        area,
        vec![Line::from(Span::styled(
            "Calculating your results...",
            Style::default().fg(Color::Cyan).bold(),
        ))],
    );
}
