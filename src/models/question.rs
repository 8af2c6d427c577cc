use serde::{Deserialize, Serialize};

use super::ValidationError;

pub const NUM_OPTIONS: usize = 4;

/// A single multiple-choice question as produced by the content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text. May embed simple inline markup.
    pub question: String,
    pub options: [String; NUM_OPTIONS],
    /// The correct option, verbatim.
    pub answer: String,
    /// Where the answer can be found, e.g. "John 3:16".
    pub reference: String,
}

impl QuizQuestion {
    /// Check the shape invariants: non-blank text, distinct options and
    /// `answer` being one of the options.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.question.trim().is_empty() {
            return Err(ValidationError::BlankQuestion);
        }

        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(ValidationError::DuplicateOption(option.clone()));
            }
        }

        if self.correct_index().is_none() {
            return Err(ValidationError::AnswerNotAnOption(self.answer.clone()));
        }

        Ok(())
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.answer)
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }

    /// The question text with markup tags removed, for the terminal.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.question)
    }
}

/// Drop `<...>` tags and decode the handful of entities the provider emits.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
pub(crate) fn sample(question: &str, answer: &str) -> QuizQuestion {
    let mut options = [
        "Moses".to_string(),
        "Abraham".to_string(),
        "Noah".to_string(),
        "David".to_string(),
    ];
    if !options.iter().any(|o| o == answer) {
        options[0] = answer.to_string();
    }
    QuizQuestion {
        question: question.to_string(),
        options,
        answer: answer.to_string(),
        reference: "Genesis 6:9".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_question() {
        let q = sample("Who built the ark?", "Noah");
        assert!(q.validate().is_ok());
        assert_eq!(q.correct_index(), Some(2));
        assert!(q.is_correct("Noah"));
        assert!(!q.is_correct("Moses"));
    }

    #[test]
    fn test_answer_must_be_an_option() {
        let mut q = sample("Who built the ark?", "Noah");
        q.answer = "Jonah".to_string();
        assert_eq!(
            q.validate(),
            Err(ValidationError::AnswerNotAnOption("Jonah".to_string()))
        );
    }

    #[test]
    fn test_duplicate_options_rejected() {
        let mut q = sample("Who built the ark?", "Noah");
        q.options[3] = "Moses".to_string();
        assert_eq!(
            q.validate(),
            Err(ValidationError::DuplicateOption("Moses".to_string()))
        );
    }

    #[test]
    fn test_blank_question_rejected() {
        let q = sample("   ", "Noah");
        assert_eq!(q.validate(), Err(ValidationError::BlankQuestion));
    }

    #[test]
    fn test_option_count_enforced_by_deserialization() {
        let json = r#"{
            "question": "Q",
            "options": ["a", "b", "c"],
            "answer": "a",
            "reference": "r"
        }"#;
        assert!(serde_json::from_str::<QuizQuestion>(json).is_err());
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("Who wrote <b>Psalm 23</b> &amp; why?"),
            "Who wrote Psalm 23 & why?"
        );
        assert_eq!(strip_markup("plain"), "plain");
        assert_eq!(strip_markup("a &lt; b"), "a < b");
    }
}
