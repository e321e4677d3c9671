//! Summary viewer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::SummaryView;

pub fn render(frame: &mut Frame, area: Rect, view: &SummaryView) {
    let chunks = Layout::vertical([
        Constraint::Length(4), // Header
        Constraint::Min(6),    // Summary text
        Constraint::Length(1), // Save status
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let words = view.word_count();
    let header = vec![
        Line::from(Span::styled(
            "DOCUMENT SUMMARY",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            view.file_name.as_str(),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!("{} words  ·  {} min read", words, view.reading_minutes()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(header).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, chunks[0]);

    let body = Paragraph::new(view.content.as_str())
        .wrap(Wrap { trim: false })
        .scroll((view.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(body, chunks[1]);

    if let Some(status) = &view.status {
        let color = if status.starts_with("Error") {
            Color::Red
        } else {
            Color::Green
        };
        let widget = Paragraph::new(status.as_str())
            .alignment(Alignment::Center)
            .fg(color);
        frame.render_widget(widget, chunks[2]);
    }

    let controls = Paragraph::new("j/k scroll  ·  s save as text  ·  q back")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[3]);
}
