//! Quiz and lesson setup forms.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::{App, SetupField};
use crate::models::Topic;

pub fn render_quiz(frame: &mut Frame, area: Rect, app: &App, error: Option<&str>) {
    let form = &app.quiz_form;
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_heading(frame, chunks[0], "Quiz Setup");

    let s = &form.settings;
    render_field(frame, chunks[1], "Topic", s.topic.label(), form.field == SetupField::Topic);
    render_field(
        frame,
        chunks[2],
        "Number of Questions",
        &s.num_questions.to_string(),
        form.field == SetupField::Count,
    );
    render_field(
        frame,
        chunks[3],
        "Difficulty",
        s.difficulty.label(),
        form.field == SetupField::Difficulty,
    );

    render_error(frame, chunks[4], error);
    super::controls(
        frame,
        chunks[5],
        "j/k field  ·  h/l change  ·  enter generate  ·  esc back",
    );
}

pub fn render_lesson(frame: &mut Frame, area: Rect, app: &App, error: Option<&str>) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(Topic::ALL.len() as u16 + 2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_heading(frame, chunks[0], "Choose a Lesson Topic");

    let lines: Vec<Line> = Topic::ALL
        .iter()
        .map(|topic| {
            let selected = *topic == app.lesson_topic;
            let style = if selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if selected { "> " } else { "  " };
            Line::from(Span::styled(format!("{marker}{}", topic.label()), style))
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, chunks[1]);

    render_error(frame, chunks[2], error);
    super::controls(frame, chunks[3], "j/k topic  ·  enter start lesson  ·  esc back");
}

fn render_heading(frame: &mut Frame, area: Rect, heading: &str) {
    let content = vec![
        super::title_line(),
        Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::White).bold(),
        )),
    ];
    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let (border, value_style) = if focused {
        (Color::Cyan, Style::default().fg(Color::Yellow).bold())
    } else {
        (Color::DarkGray, Style::default().fg(Color::White))
    };

    let line = Line::from(vec![
        Span::styled("< ", Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), value_style),
        Span::styled(" >", Style::default().fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {label} "))
            .title_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, area);
}

fn render_error(frame: &mut Frame, area: Rect, error: Option<&str>) {
    let Some(error) = error else {
        return;
    };

    let widget = Paragraph::new(error.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red).bold());
    frame.render_widget(widget, area);
}
