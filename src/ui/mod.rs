//! One render module per screen.

mod generating;
mod lesson;
mod menu;
mod quiz;
mod results;
mod setup;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::state::Screen;

pub const TITLE: &str = "SCRIPTURE QUIZ";

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.screen() {
        Screen::Menu => menu::render(frame, area, app),
        Screen::QuizSetup { error, .. } => setup::render_quiz(frame, area, app, error.as_deref()),
        Screen::LessonSetup { error, .. } => {
            setup::render_lesson(frame, area, app, error.as_deref())
        }
        Screen::Generating { request } => generating::render(frame, area, request, app.tick()),
        Screen::InLesson { lesson, .. } => lesson::render(frame, area, lesson, app.scroll()),
        Screen::InQuiz { runner, .. } => quiz::render(frame, area, runner),
        Screen::Results { context, .. } => {
            if let Some(report) = app.report() {
                results::render(frame, area, context, &report, app.scroll());
            }
        }
    }
}

fn title_line() -> Line<'static> {
    Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()))
}

fn controls(frame: &mut Frame, area: Rect, text: &str) {
    let widget = ratatui::widgets::Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
