use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::models::{EXAM_LENGTH, Lesson, strip_markup};

pub fn render(frame: &mut Frame, area: Rect, lesson: &Lesson, scroll: u16) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        strip_markup(&lesson.title),
        Style::default().fg(Color::Cyan).bold(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let mut lines = Vec::with_capacity(lesson.content.len() * 2);
    for paragraph in &lesson.content {
        lines.push(Line::from(Span::styled(
            strip_markup(paragraph),
            Style::default().fg(Color::White),
        )));
        lines.push(Line::from(""));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray)
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(body, chunks[1]);

    super::controls(
        frame,
        chunks[2],
        &format!("j/k scroll  ·  enter take the {EXAM_LENGTH}-question exam  ·  esc topics"),
    );
}
