//! Quiz runner: one question at a time, one answer slot per question.

use std::fmt;

use crate::models::{NUM_OPTIONS, QuizQuestion};

/// What the user did with one question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnswerSlot {
    #[default]
    Unset,
    Chosen(String),
    /// The user explicitly declined to answer.
    Skipped,
}

impl AnswerSlot {
    pub fn chosen(&self) -> Option<&str> {
        match self {
            AnswerSlot::Chosen(option) => Some(option),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, AnswerSlot::Skipped)
    }
}

impl fmt::Display for AnswerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerSlot::Unset => Ok(()),
            AnswerSlot::Chosen(option) => f.write_str(option),
            AnswerSlot::Skipped => f.write_str("skipped"),
        }
    }
}

/// One slot per question, all unset at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerRecord(Vec<AnswerSlot>);

impl AnswerRecord {
    pub fn new(len: usize) -> Self {
        Self(vec![AnswerSlot::Unset; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AnswerSlot> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerSlot> {
        self.0.iter()
    }

    fn set(&mut self, index: usize, slot: AnswerSlot) {
        if let Some(existing) = self.0.get_mut(index) {
            *existing = slot;
        }
    }
}

impl From<Vec<AnswerSlot>> for AnswerRecord {
    fn from(slots: Vec<AnswerSlot>) -> Self {
        Self(slots)
    }
}

/// Outcome of a runner operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerStep {
    /// The operation is not valid in the current step; nothing changed.
    Ignored,
    /// An option was recorded and the answer is now revealed.
    Answered,
    /// The cursor moved to this question.
    Moved(usize),
    /// The last question was finished. The run is over.
    Completed(AnswerRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRunner {
    questions: Vec<QuizQuestion>,
    answers: AnswerRecord,
    cursor: usize,
    /// Option chosen for the current question, if answered.
    selected: Option<String>,
    /// Keyboard cursor over the current question's options.
    highlighted: usize,
    finished: bool,
}

impl QuizRunner {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let answers = AnswerRecord::new(questions.len());
        Self {
            questions,
            answers,
            cursor: 0,
            selected: None,
            highlighted: 0,
            finished: false,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.cursor)
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn current_question_number(&self) -> usize {
        self.cursor + 1
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn into_questions(self) -> Vec<QuizQuestion> {
        self.questions
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn is_last_question(&self) -> bool {
        self.cursor + 1 >= self.questions.len()
    }

    /// Fraction of questions already behind the cursor.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        if self.finished {
            return 1.0;
        }
        self.cursor as f64 / self.questions.len() as f64
    }

    pub fn highlight_next(&mut self) {
        if !self.is_answered() {
            self.highlighted = (self.highlighted + 1) % NUM_OPTIONS;
        }
    }

    pub fn highlight_previous(&mut self) {
        if !self.is_answered() {
            self.highlighted = (self.highlighted + NUM_OPTIONS - 1) % NUM_OPTIONS;
        }
    }

    /// Record the highlighted option as the answer.
    pub fn select_highlighted(&mut self) -> RunnerStep {
        let Some(option) = self
            .current_question()
            .and_then(|q| q.options.get(self.highlighted))
            .cloned()
        else {
            return RunnerStep::Ignored;
        };
        self.select(&option)
    }

    /// Record `option` for the current question. First answer wins.
    pub fn select(&mut self, option: &str) -> RunnerStep {
        if self.finished || self.is_answered() || self.current_question().is_none() {
            return RunnerStep::Ignored;
        }

        self.answers
            .set(self.cursor, AnswerSlot::Chosen(option.to_string()));
        self.selected = Some(option.to_string());
        RunnerStep::Answered
    }

    /// Record a skip and move on without revealing the answer.
    pub fn skip(&mut self) -> RunnerStep {
        if self.finished || self.is_answered() || self.current_question().is_none() {
            return RunnerStep::Ignored;
        }

        self.answers.set(self.cursor, AnswerSlot::Skipped);
        self.move_on()
    }

    /// Leave an answered question.
    pub fn advance(&mut self) -> RunnerStep {
        if self.finished || !self.is_answered() {
            return RunnerStep::Ignored;
        }
        self.move_on()
    }

    fn move_on(&mut self) -> RunnerStep {
        self.selected = None;
        self.highlighted = 0;

        if self.is_last_question() {
            self.finished = true;
            return RunnerStep::Completed(self.answers.clone());
        }

        self.cursor += 1;
        RunnerStep::Moved(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_question;

    fn questions(n: usize) -> Vec<QuizQuestion> {
        (0..n)
            .map(|i| sample_question(&format!("Question {i}"), "Noah"))
            .collect()
    }

    #[test]
    fn test_advance_count_matches_question_count() {
        for n in 1..=6 {
            let mut runner = QuizRunner::new(questions(n));
            let mut advances = 0;
            let record = loop {
                assert_eq!(runner.select("Moses"), RunnerStep::Answered);
                advances += 1;
                match runner.advance() {
                    RunnerStep::Completed(record) => break record,
                    RunnerStep::Moved(index) => assert_eq!(index, advances),
                    other => panic!("unexpected step {other:?}"),
                }
            };
            assert_eq!(advances, n);
            assert_eq!(record.len(), n);
        }
    }

    #[test]
    fn test_first_answer_wins() {
        let mut runner = QuizRunner::new(questions(2));
        assert_eq!(runner.select("Moses"), RunnerStep::Answered);
        assert_eq!(runner.select("Noah"), RunnerStep::Ignored);
        assert_eq!(runner.selected(), Some("Moses"));
        assert_eq!(
            runner.answers().get(0),
            Some(&AnswerSlot::Chosen("Moses".to_string()))
        );
    }

    #[test]
    fn test_skip_records_sentinel_without_reveal() {
        let mut runner = QuizRunner::new(questions(2));
        assert_eq!(runner.skip(), RunnerStep::Moved(1));
        assert_eq!(runner.answers().get(0), Some(&AnswerSlot::Skipped));
        assert!(!runner.is_answered());
        assert_eq!(runner.selected(), None);

        match runner.skip() {
            RunnerStep::Completed(record) => {
                assert!(record.iter().all(AnswerSlot::is_skipped));
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_skip_not_allowed_after_answer() {
        let mut runner = QuizRunner::new(questions(2));
        runner.select("Noah");
        assert_eq!(runner.skip(), RunnerStep::Ignored);
        assert_eq!(
            runner.answers().get(0),
            Some(&AnswerSlot::Chosen("Noah".to_string()))
        );
    }

    #[test]
    fn test_advance_requires_answer() {
        let mut runner = QuizRunner::new(questions(2));
        assert_eq!(runner.advance(), RunnerStep::Ignored);
        assert_eq!(runner.current_index(), 0);
    }

    #[test]
    fn test_state_resets_on_index_change() {
        let mut runner = QuizRunner::new(questions(3));
        runner.highlight_next();
        runner.highlight_next();
        assert_eq!(runner.select_highlighted(), RunnerStep::Answered);
        assert_eq!(runner.selected(), Some("Noah"));

        runner.advance();
        assert!(!runner.is_answered());
        assert_eq!(runner.selected(), None);
        assert_eq!(runner.highlighted(), 0);
    }

    #[test]
    fn test_progress() {
        let mut runner = QuizRunner::new(questions(4));
        assert_eq!(runner.progress(), 0.0);
        runner.select("Noah");
        assert_eq!(runner.progress(), 0.0);
        runner.advance();
        assert_eq!(runner.progress(), 0.25);
        runner.skip();
        runner.skip();
        assert_eq!(runner.progress(), 0.75);
        runner.select("Noah");
        assert!(runner.progress() < 1.0);
        runner.advance();
        assert_eq!(runner.progress(), 1.0);
    }

    #[test]
    fn test_operations_ignored_after_completion() {
        let mut runner = QuizRunner::new(questions(1));
        runner.select("Noah");
        assert!(matches!(runner.advance(), RunnerStep::Completed(_)));
        assert_eq!(runner.select("Moses"), RunnerStep::Ignored);
        assert_eq!(runner.skip(), RunnerStep::Ignored);
        assert_eq!(runner.advance(), RunnerStep::Ignored);
        assert!(runner.current_question().is_none());
    }

    #[test]
    fn test_highlight_frozen_while_revealed() {
        let mut runner = QuizRunner::new(questions(1));
        runner.select_highlighted();
        runner.highlight_next();
        assert_eq!(runner.highlighted(), 0);
    }

    #[test]
    fn test_empty_runner_ignores_everything() {
        let mut runner = QuizRunner::new(Vec::new());
        assert_eq!(runner.select("x"), RunnerStep::Ignored);
        assert_eq!(runner.skip(), RunnerStep::Ignored);
        assert_eq!(runner.progress(), 0.0);
    }
}
