mod lesson;
mod question;
mod settings;

use thiserror::Error;

pub use lesson::{EXAM_LENGTH, Lesson};
pub use question::{NUM_OPTIONS, QuizQuestion, strip_markup};
pub use settings::{Difficulty, QuestionCount, QuizSettings, Topic, cycle};

#[cfg(test)]
pub(crate) use lesson::sample as sample_lesson;
#[cfg(test)]
pub(crate) use question::sample as sample_question;

/// Ways provider content can violate the data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("question text is blank")]
    BlankQuestion,

    #[error("option {0:?} appears more than once")]
    DuplicateOption(String),

    #[error("answer {0:?} is not one of the options")]
    AnswerNotAnOption(String),

    #[error("lesson has no content")]
    EmptyLesson,

    #[error("exam must have {expected} questions, got {actual}")]
    ExamLength { expected: usize, actual: usize },

    #[error("question {}: {}", .0 + 1, .1)]
    InQuestion(usize, Box<ValidationError>),
}
