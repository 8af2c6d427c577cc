use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::models::QuizQuestion;
use crate::runner::QuizRunner;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

pub fn render(frame: &mut Frame, area: Rect, runner: &QuizRunner) {
    let Some(question) = runner.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], chunks[1], runner);
    render_question_text(frame, chunks[2], &question.plain_text());
    render_options(frame, chunks[3], question, runner);

    if runner.is_answered() {
        render_reveal(frame, chunks[4], question, runner.selected());
        let next = if runner.is_last_question() {
            "enter see results  ·  q quit"
        } else {
            "enter next question  ·  q quit"
        };
        super::controls(frame, chunks[5], next);
    } else {
        super::controls(
            frame,
            chunks[5],
            "j/k navigate  ·  enter or 1-4 answer  ·  s skip  ·  q quit",
        );
    }
}

fn render_progress(frame: &mut Frame, label_area: Rect, bar_area: Rect, runner: &QuizRunner) {
    let label = format!(
        "Question {} of {}",
        runner.current_question_number(),
        runner.total_questions()
    );
    let widget = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).bold());
    frame.render_widget(widget, label_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(runner.progress().clamp(0.0, 1.0))
        .label("");
    frame.render_widget(gauge, bar_area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text.to_string())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn option_style(question: &QuizQuestion, option: &str, index: usize, runner: &QuizRunner) -> Style {
    match runner.selected() {
        None if index == runner.highlighted() => Style::default().fg(Color::Yellow).bold(),
        None => Style::default().fg(Color::White),
        Some(_) if question.is_correct(option) => Style::default().fg(Color::Green).bold(),
        Some(chosen) if chosen == option => Style::default().fg(Color::Red).bold(),
        Some(_) => Style::default().fg(Color::DarkGray),
    }
}

fn render_options(frame: &mut Frame, area: Rect, question: &QuizQuestion, runner: &QuizRunner) {
    let mut lines: Vec<Line> = Vec::with_capacity(question.options.len() * 2);

    for (index, option) in question.options.iter().enumerate() {
        let style = option_style(question, option, index, runner);
        let marker = match runner.selected() {
            None if index == runner.highlighted() => ">",
            Some(_) if question.is_correct(option) => "✓",
            Some(chosen) if chosen == option.as_str() => "✗",
            _ => " ",
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{}) ", OPTION_LABELS[index]), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_reveal(frame: &mut Frame, area: Rect, question: &QuizQuestion, chosen: Option<&str>) {
    let correct = chosen.is_some_and(|c| question.is_correct(c));
    let verdict = if correct {
        Span::styled("Correct!", Style::default().fg(Color::Green).bold())
    } else {
        Span::styled(
            format!("Not quite. The answer is {}.", question.answer),
            Style::default().fg(Color::Red).bold(),
        )
    };

    let content = vec![
        Line::from(verdict),
        Line::from(Span::styled(
            format!("Reference: {}", question.reference),
            Style::default().fg(Color::DarkGray).italic(),
        )),
    ];
    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}
