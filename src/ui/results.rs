use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::scoring::{Grade, Mark, QuestionFeedback, ScoreReport};
use crate::state::QuizContext;

pub fn render(frame: &mut Frame, area: Rect, context: &QuizContext, report: &ScoreReport, scroll: u16) {
    let chunks = Layout::vertical([
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], context, report);
    render_feedback(frame, chunks[1], &report.feedback, scroll);
    super::controls(
        frame,
        chunks[2],
        &format!(
            "j/k scroll  ·  r {}  ·  n {}  ·  q quit",
            context.retry_label(),
            context.fresh_label()
        ),
    );
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::High => Color::Green,
        Grade::Middle => Color::Yellow,
        Grade::Low => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, context: &QuizContext, report: &ScoreReport) {
    let heading = match context {
        QuizContext::Quiz(settings) => format!("QUIZ RESULTS · {}", settings.topic),
        QuizContext::Exam { lesson, .. } => format!("EXAM RESULTS · {}", lesson.title),
    };
    let color = grade_color(report.grade());

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(heading, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}%", report.percentage),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{} of {} correct  ·  {} incorrect  ·  {} skipped",
                report.correct,
                report.total,
                report.incorrect(),
                report.skipped()
            ),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(report.message(), Style::default().fg(color))),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

/// Symbol, symbol color and answer-line style for each mark.
fn mark_style(mark: Mark) -> (&'static str, Color, Style) {
    match mark {
        Mark::Correct => ("✓", Color::Green, Style::default().fg(Color::Green)),
        Mark::Wrong => ("✗", Color::Red, Style::default().fg(Color::Red)),
        Mark::Skipped => ("»", Color::Yellow, Style::default().fg(Color::Yellow).italic()),
        Mark::Unanswered => ("·", Color::DarkGray, Style::default().fg(Color::Gray).italic()),
    }
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: &[QuestionFeedback], scroll: u16) {
    let mut lines: Vec<Line> = Vec::new();

    for (index, item) in feedback.iter().enumerate() {
        let mark = item.mark();
        let (symbol, color, answer_style) = mark_style(mark);
        lines.push(Line::from(vec![
            Span::styled(format!(" {symbol} "), Style::default().fg(color).bold()),
            Span::styled(format!("{:2}. ", index + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(item.question.clone(), Style::default().fg(Color::White)),
        ]));

        lines.push(Line::from(Span::styled(
            format!("      {}", item.answer_text()),
            answer_style,
        )));

        if mark != Mark::Correct {
            lines.push(Line::from(Span::styled(
                format!("      Correct answer: {}", item.correct_answer),
                Style::default().fg(Color::Green),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!("      {}", item.reference),
            Style::default().fg(Color::DarkGray).italic(),
        )));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(widget, area);
}
