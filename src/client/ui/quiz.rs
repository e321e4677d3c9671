//! Quiz screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::models::Question;
use crate::quiz::{format_clock, QuizSession};

/// Below this many seconds the clock turns red.
const WARNING_SECS: u32 = 60;

/// Render the question being answered.
pub fn render(frame: &mut Frame, area: Rect, session: &QuizSession, cursor: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Progress and clock
        Constraint::Length(3), // Question strip
        Constraint::Length(7), // Question text
        Constraint::Min(6),    // Options
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], session);
    render_indicators(frame, chunks[1], session);
    render_question_text(frame, chunks[2], session.current_question());
    render_options(frame, chunks[3], session.current_question(), session.current_answer(), cursor);
    render_controls(frame, chunks[4], session);
}

fn render_progress(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let remaining = session.remaining_secs();
    let clock_style = if remaining < WARNING_SECS {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::White).bold()
    };

    let line = Line::from(vec![
        Span::styled(
            format!("Question {} of {}", session.current_index().number(), session.len()),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} answered", session.answered_count()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("Time left {}", format_clock(remaining)), clock_style),
    ]);

    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

/// One box per question: current, answered or open.
fn render_indicators(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let current = session.current_index();
    let spans: Vec<Span> = session
        .indices()
        .map(|index| {
            let style = if index == current {
                Style::default().fg(Color::Black).bg(Color::Yellow).bold()
            } else if session.answer(index).is_some() {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::Gray).bg(Color::DarkGray)
            };
            Span::styled(format!(" {} ", index.number()), style)
        })
        .flat_map(|span| [span, Span::raw(" ")])
        .collect();

    let widget = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, question: &Question) {
    let widget = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

/// Option label: A, B, C... then numbers past Z.
pub(super) fn option_label(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    answer: Option<usize>,
    cursor: usize,
) {
    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let is_cursor = i == cursor;
            let is_chosen = answer == Some(i);
            let prefix = if is_cursor { "> " } else { "  " };
            let marker = if is_chosen { "(*) " } else { "( ) " };

            let style = if is_chosen {
                Style::default().fg(Color::Green).bold()
            } else if is_cursor {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(marker, style),
                Span::styled(format!("{}) ", option_label(i)), style),
                Span::styled(opt.clone(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let enabled = Style::default().fg(Color::Gray);
    let disabled = Style::default().fg(Color::DarkGray);
    let pick = |on: bool| if on { enabled } else { disabled };

    let mut spans = vec![
        Span::styled("Enter select  ·  ", enabled),
        Span::styled("← Previous", pick(session.can_go_previous())),
        Span::styled("  ·  ", disabled),
    ];
    if session.is_last_question() {
        spans.push(Span::styled("f Finish", pick(session.can_finish())));
    } else {
        spans.push(Span::styled("Next →", pick(session.can_go_next())));
    }
    spans.push(Span::styled("  ·  1-9 / Tab jump  ·  q exit", disabled));

    let widget = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_label() {
        assert_eq!(option_label(0), "A");
        assert_eq!(option_label(3), "D");
        assert_eq!(option_label(25), "Z");
        assert_eq!(option_label(26), "27");
    }
}
