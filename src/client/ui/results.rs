//! Results screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::quiz::{format_clock, FinishReason, QuizResult, QuizSession, Verdict};

use super::quiz::option_label;

const QUESTION_PREVIEW_LENGTH: usize = 60;

/// Render the revealed results of a session.
pub fn render(frame: &mut Frame, area: Rect, session: &QuizSession, scroll: u16) {
    let Some(result) = session.result() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(8), // Score summary
        Constraint::Min(8),    // Review
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], &result);
    render_review(frame, chunks[1], session, scroll);
    render_controls(frame, chunks[2]);
}

fn grade_color(percentage: u32) -> Color {
    match percentage {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, result: &QuizResult) {
    let performance = result.performance();
    let color = grade_color(result.percentage);
    let heading = match result.reason {
        FinishReason::Submitted => "RESULTS",
        FinishReason::TimedOut => "TIME'S UP",
    };

    let content = vec![
        Line::from(Span::styled(
            heading,
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({}%)  {}",
                result.score,
                result.total,
                result.percentage,
                performance.label()
            ),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            performance.message(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} of {} answered  ·  time used {}",
                result.answered,
                result.total,
                format_clock(result.time_used_secs)
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, area);
}

fn render_review(frame: &mut Frame, area: Rect, session: &QuizSession, scroll: u16) {
    let mut lines: Vec<Line> = Vec::new();

    for entry in session.review() {
        let (symbol, color) = match entry.verdict {
            Verdict::Correct => ("+", Color::Green),
            Verdict::Incorrect { .. } => ("-", Color::Red),
            Verdict::Unanswered => ("?", Color::Yellow),
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
            Span::styled(
                format!("{:2}. ", entry.number),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                truncate_question(&entry.question.text),
                Style::default().fg(Color::Gray),
            ),
        ]));

        let chosen = entry
            .chosen_text()
            .map_or_else(|| "not answered".to_string(), str::to_string);
        lines.push(Line::from(vec![
            Span::raw("       Your answer: "),
            Span::styled(chosen, Style::default().fg(color)),
        ]));

        if !matches!(entry.verdict, Verdict::Correct) {
            let correct = match (entry.question.correct_index, entry.question.correct_option()) {
                (Some(index), Some(text)) => format!("{}) {}", option_label(index), text),
                _ => "no answer key".to_string(),
            };
            lines.push(Line::from(vec![
                Span::raw("       Correct:     "),
                Span::styled(correct, Style::default().fg(Color::Green)),
            ]));
        }
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Review ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .scroll((scroll, 0));

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r try again  ·  h home  ·  q exit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_question() {
        assert_eq!(truncate_question("short"), "short");
        let long = "x".repeat(QUESTION_PREVIEW_LENGTH + 5);
        let truncated = truncate_question(&long);
        assert_eq!(truncated.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_grade_color() {
        assert_eq!(grade_color(95), Color::Green);
        assert_eq!(grade_color(33), Color::Red);
    }
}
