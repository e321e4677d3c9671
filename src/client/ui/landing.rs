//! Landing menu.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::Mode;

pub fn render(frame: &mut Frame, area: Rect, selected: usize, api_url: Option<&str>) {
    let chunks = Layout::vertical([
        Constraint::Length(6), // Title
        Constraint::Min(9),    // Menu
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let mut title = vec![
        Line::from(""),
        Line::from(Span::styled(
            "DOC QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            "Turn your documents into quizzes, summaries and answers",
            Style::default().fg(Color::Gray),
        )),
    ];
    if let Some(url) = api_url {
        title.push(Line::from(Span::styled(
            format!("Server: {}", url),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), chunks[0]);

    let mut lines = Vec::new();
    for (i, mode) in Mode::ALL.iter().enumerate() {
        let is_selected = i == selected;
        let style = if is_selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        };
        let prefix = if is_selected { "> " } else { "  " };

        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(format!("{}. {}", i + 1, mode.title()), style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("     {}", mode.description()),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    let menu = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" What would you like to do? ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(2, 2, 1, 0)),
    );
    frame.render_widget(menu, chunks[1]);

    let controls = Paragraph::new("j/k or arrows to move  ·  Enter or 1-3 to open  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[2]);
}
