//! Q&A chat about a processed document.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::ChatView;
use crate::protocol::ChatRole;

pub fn render(frame: &mut Frame, area: Rect, view: &ChatView) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Header
        Constraint::Min(6),    // Transcript
        Constraint::Length(3), // Input
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let header = Line::from(vec![
        Span::styled("Q&A  ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(view.file_name.as_str(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    render_transcript(frame, chunks[1], view);
    render_input(frame, chunks[2], view);

    let controls = Paragraph::new("Enter send  ·  Esc back")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[3]);
}

fn render_transcript(frame: &mut Frame, area: Rect, view: &ChatView) {
    let mut lines: Vec<Line> = Vec::new();
    if view.messages.is_empty() && !view.waiting {
        lines.push(Line::from(Span::styled(
            "Ask anything about the document.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for message in &view.messages {
        let (name, color) = match message.role {
            ChatRole::User => ("You", Color::Yellow),
            ChatRole::Ai => ("AI", Color::Cyan),
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", name),
            Style::default().fg(color).bold(),
        )));
        for text in message.content.lines() {
            lines.push(Line::from(Span::raw(format!("  {}", text))));
        }
        lines.push(Line::from(""));
    }

    if view.waiting {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Cyan).bold(),
        )));
        lines.push(Line::from(Span::styled(
            "  Typing...",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }

    // Keep the newest messages in view.
    let visible = area.height.saturating_sub(2);
    let scroll = (lines.len() as u16).saturating_sub(visible);

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_input(frame: &mut Frame, area: Rect, view: &ChatView) {
    let (text, style) = if view.waiting {
        ("Waiting for an answer...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (format!("{}_", view.input), Style::default().fg(Color::White))
    };

    let widget = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Ask a question about the document ")
            .title_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, area);
}
