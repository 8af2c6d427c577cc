use serde::{Deserialize, Serialize};

use super::{QuizQuestion, ValidationError};

/// Number of questions in the exam that closes every lesson.
pub const EXAM_LENGTH: usize = 5;

/// A generated lesson followed by a short exam on its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    /// One entry per paragraph.
    pub content: Vec<String>,
    pub exam: Vec<QuizQuestion>,
}

impl Lesson {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content.is_empty() {
            return Err(ValidationError::EmptyLesson);
        }

        if self.exam.len() != EXAM_LENGTH {
            return Err(ValidationError::ExamLength {
                expected: EXAM_LENGTH,
                actual: self.exam.len(),
            });
        }

        for (index, question) in self.exam.iter().enumerate() {
            question
                .validate()
                .map_err(|e| ValidationError::InQuestion(index, Box::new(e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample(title: &str) -> Lesson {
    Lesson {
        title: title.to_string(),
        content: vec![
            "In the beginning God created the heavens and the earth.".to_string(),
            "On the seventh day He rested.".to_string(),
        ],
        exam: (0..EXAM_LENGTH)
            .map(|i| super::question::sample(&format!("Exam question {}", i + 1), "Noah"))
            .collect(),
    }
}
