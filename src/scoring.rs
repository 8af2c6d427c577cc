//! Results scoring and per-question feedback.

use crate::models::QuizQuestion;
use crate::runner::{AnswerRecord, AnswerSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Skipped,
    /// A wrong guess or no answer at all.
    Incorrect,
}

/// How a feedback row is marked on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Correct,
    Wrong,
    Skipped,
    Unanswered,
}

/// Color band for the headline percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    High,
    Middle,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFeedback {
    pub question: String,
    /// `None` when skipped or never answered.
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub reference: String,
    pub outcome: Outcome,
}

impl QuestionFeedback {
    pub fn answer_text(&self) -> String {
        match (self.outcome, &self.your_answer) {
            (Outcome::Skipped, _) => "You skipped this question.".to_string(),
            (_, Some(answer)) => format!("Your answer: {answer}"),
            (_, None) => "Not answered".to_string(),
        }
    }

    pub fn mark(&self) -> Mark {
        match (self.outcome, &self.your_answer) {
            (Outcome::Correct, _) => Mark::Correct,
            (Outcome::Skipped, _) => Mark::Skipped,
            (Outcome::Incorrect, Some(_)) => Mark::Wrong,
            (Outcome::Incorrect, None) => Mark::Unanswered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub feedback: Vec<QuestionFeedback>,
}

impl ScoreReport {
    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    pub fn incorrect(&self) -> usize {
        self.count(Outcome::Incorrect)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.feedback.iter().filter(|f| f.outcome == outcome).count()
    }

    pub fn grade(&self) -> Grade {
        match self.percentage {
            80.. => Grade::High,
            50..=79 => Grade::Middle,
            _ => Grade::Low,
        }
    }

    pub fn message(&self) -> &'static str {
        match self.percentage {
            90.. => "Excellent work! Truly a Bible scholar.",
            70..=89 => "Great job! Your knowledge is impressive.",
            50..=69 => "Good effort! Keep studying and you'll master it.",
            _ => "Keep practicing! Every step is progress.",
        }
    }
}

pub fn calculate_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// Compare each recorded answer with the question's answer.
pub fn score(questions: &[QuizQuestion], answers: &AnswerRecord) -> ScoreReport {
    let feedback: Vec<QuestionFeedback> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let slot = answers.get(index).unwrap_or(&AnswerSlot::Unset);
            let outcome = match slot {
                AnswerSlot::Chosen(option) if question.is_correct(option) => Outcome::Correct,
                AnswerSlot::Skipped => Outcome::Skipped,
                _ => Outcome::Incorrect,
            };

            QuestionFeedback {
                question: question.plain_text(),
                your_answer: slot.chosen().map(str::to_string),
                correct_answer: question.answer.clone(),
                reference: question.reference.clone(),
                outcome,
            }
        })
        .collect();

    let correct = feedback
        .iter()
        .filter(|f| f.outcome == Outcome::Correct)
        .count();
    let total = questions.len();

    ScoreReport {
        correct,
        total,
        percentage: calculate_percentage(correct, total),
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_question;

    fn chosen(option: &str) -> AnswerSlot {
        AnswerSlot::Chosen(option.to_string())
    }

    #[test]
    fn test_no_questions_scores_zero() {
        let report = score(&[], &AnswerRecord::default());
        assert_eq!(report.percentage, 0);
        assert_eq!(report.total, 0);
        assert!(report.feedback.is_empty());
    }

    #[test]
    fn test_single_correct_answer() {
        let q = sample_question("Who built the ark?", "Noah");
        let report = score(&[q], &AnswerRecord::from(vec![chosen("Noah")]));
        assert_eq!(report.percentage, 100);
        assert_eq!(report.feedback[0].outcome, Outcome::Correct);
    }

    #[test]
    fn test_skipped_is_not_incorrect() {
        let q = sample_question("Who built the ark?", "Noah");
        let report = score(&[q], &AnswerRecord::from(vec![AnswerSlot::Skipped]));
        assert_eq!(report.percentage, 0);
        assert_eq!(report.feedback[0].outcome, Outcome::Skipped);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.incorrect(), 0);
        assert_eq!(report.feedback[0].answer_text(), "You skipped this question.");
    }

    #[test]
    fn test_option_named_skipped_is_a_real_answer() {
        let mut q = sample_question("Pick one", "Noah");
        q.options[0] = "skipped".to_string();
        let report = score(&[q], &AnswerRecord::from(vec![chosen("skipped")]));
        assert_eq!(report.feedback[0].outcome, Outcome::Incorrect);
        assert_eq!(report.feedback[0].answer_text(), "Your answer: skipped");
    }

    #[test]
    fn test_unset_counts_as_incorrect() {
        let q = sample_question("Who built the ark?", "Noah");
        let report = score(&[q], &AnswerRecord::new(1));
        assert_eq!(report.feedback[0].outcome, Outcome::Incorrect);
        assert_eq!(report.feedback[0].your_answer, None);
        assert_eq!(report.feedback[0].answer_text(), "Not answered");
    }

    #[test]
    fn test_marks_separate_wrong_from_missing() {
        let questions = vec![
            sample_question("One", "Noah"),
            sample_question("Two", "Noah"),
            sample_question("Three", "Noah"),
            sample_question("Four", "Noah"),
        ];
        let answers = AnswerRecord::from(vec![
            chosen("Noah"),
            chosen("Moses"),
            AnswerSlot::Skipped,
            AnswerSlot::Unset,
        ]);
        let marks: Vec<Mark> = score(&questions, &answers)
            .feedback
            .iter()
            .map(QuestionFeedback::mark)
            .collect();
        assert_eq!(
            marks,
            vec![Mark::Correct, Mark::Wrong, Mark::Skipped, Mark::Unanswered]
        );
    }

    #[test]
    fn test_mixed_outcomes_and_rounding() {
        let questions = vec![
            sample_question("One", "Noah"),
            sample_question("Two", "Noah"),
            sample_question("Three", "Noah"),
        ];
        let answers = AnswerRecord::from(vec![chosen("Noah"), chosen("Noah"), chosen("Moses")]);
        let report = score(&questions, &answers);
        assert_eq!(report.correct, 2);
        assert_eq!(report.percentage, 67);
        assert_eq!(report.incorrect(), 1);
        assert_eq!(report.feedback[2].correct_answer, "Noah");
        assert_eq!(report.feedback[2].reference, "Genesis 6:9");
        assert_eq!(report.grade(), Grade::Middle);
    }

    #[test]
    fn test_grade_and_message_bands() {
        assert_eq!(calculate_percentage(1, 2), 50);
        assert_eq!(calculate_percentage(1, 8), 13);

        let mut report = score(&[], &AnswerRecord::default());
        report.percentage = 95;
        assert_eq!(report.grade(), Grade::High);
        assert_eq!(report.message(), "Excellent work! Truly a Bible scholar.");
        report.percentage = 75;
        assert_eq!(report.message(), "Great job! Your knowledge is impressive.");
        report.percentage = 30;
        assert_eq!(report.grade(), Grade::Low);
        assert_eq!(report.message(), "Keep practicing! Every step is progress.");
    }
}
