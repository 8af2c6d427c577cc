use ratatui::{prelude::*, widgets::Paragraph};

use crate::provider::GenerationRequest;

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub fn render(frame: &mut Frame, area: Rect, request: &GenerationRequest, tick: usize) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let detail = match request {
        GenerationRequest::Quiz(settings) => format!(
            "{} · {} · {} questions",
            settings.topic, settings.difficulty, settings.num_questions
        ),
        GenerationRequest::Lesson(topic) => format!("Lesson · {topic}"),
    };

    let content = vec![
        Line::from(""),
        super::title_line(),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Generating content...", SPINNER[tick % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
