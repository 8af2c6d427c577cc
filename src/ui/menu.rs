use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::provider::Mode;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Fill(1),
    ])
    .split(area);

    let mut content = vec![
        Line::from(""),
        super::title_line(),
        Line::from(""),
        Line::from("Test your knowledge or learn something new".fg(Color::DarkGray)),
        Line::from(""),
    ];

    for (mode, label, hint) in [
        (Mode::Quiz, "Take a Quiz", "Choose a topic and difficulty"),
        (Mode::Lesson, "Start a Lesson", "Read a short lesson, then take its exam"),
    ] {
        let selected = app.menu_choice == mode;
        let style = if selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if selected { "> " } else { "  " };
        content.push(Line::from(Span::styled(format!("{marker}{label}"), style)));
        content.push(Line::from(hint.fg(Color::DarkGray)));
    }

    content.push(Line::from(""));
    content.push(Line::from(
        "j/k choose  ·  enter select  ·  q quit".fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
