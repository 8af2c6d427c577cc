//! Quiz settings chosen on the setup screen.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subjects the content is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Genesis,
    Exodus,
    #[serde(rename = "Life of Jesus")]
    LifeOfJesus,
    #[serde(rename = "Paul's Letters")]
    PaulsLetters,
    #[serde(rename = "Old Testament Overview")]
    OldTestamentOverview,
    #[serde(rename = "New Testament Overview")]
    NewTestamentOverview,
    #[serde(rename = "The Prophets")]
    TheProphets,
    #[serde(rename = "Psalms & Proverbs")]
    PsalmsAndProverbs,
    #[serde(rename = "Book of Revelation")]
    BookOfRevelation,
}

impl Topic {
    pub const ALL: [Topic; 9] = [
        Topic::Genesis,
        Topic::Exodus,
        Topic::LifeOfJesus,
        Topic::PaulsLetters,
        Topic::OldTestamentOverview,
        Topic::NewTestamentOverview,
        Topic::TheProphets,
        Topic::PsalmsAndProverbs,
        Topic::BookOfRevelation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::Genesis => "Genesis",
            Topic::Exodus => "Exodus",
            Topic::LifeOfJesus => "Life of Jesus",
            Topic::PaulsLetters => "Paul's Letters",
            Topic::OldTestamentOverview => "Old Testament Overview",
            Topic::NewTestamentOverview => "New Testament Overview",
            Topic::TheProphets => "The Prophets",
            Topic::PsalmsAndProverbs => "Psalms & Proverbs",
            Topic::BookOfRevelation => "Book of Revelation",
        }
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How many questions to request. Serialized as the plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuestionCount {
    Five,
    #[default]
    Ten,
    Fifteen,
    Twenty,
}

impl QuestionCount {
    pub const ALL: [QuestionCount; 4] = [
        QuestionCount::Five,
        QuestionCount::Ten,
        QuestionCount::Fifteen,
        QuestionCount::Twenty,
    ];

    pub fn get(self) -> usize {
        u8::from(self) as usize
    }
}

impl From<QuestionCount> for u8 {
    fn from(count: QuestionCount) -> Self {
        match count {
            QuestionCount::Five => 5,
            QuestionCount::Ten => 10,
            QuestionCount::Fifteen => 15,
            QuestionCount::Twenty => 20,
        }
    }
}

impl TryFrom<u8> for QuestionCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        QuestionCount::ALL
            .into_iter()
            .find(|c| u8::from(*c) == value)
            .ok_or_else(|| format!("unsupported question count: {value}"))
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Settings for one generated quiz. Reused verbatim on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub num_questions: QuestionCount,
}

impl QuizSettings {
    pub fn new(topic: Topic, difficulty: Difficulty, num_questions: QuestionCount) -> Self {
        Self {
            topic,
            difficulty,
            num_questions,
        }
    }
}

/// Step through a fixed option list, wrapping at both ends.
pub fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let index = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    all[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_serialize_with_contract_names() {
        let settings = QuizSettings::new(Topic::LifeOfJesus, Difficulty::Hard, QuestionCount::Fifteen);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(
            json,
            r#"{"topic":"Life of Jesus","difficulty":"Hard","numQuestions":15}"#
        );

        let back: QuizSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_unsupported_count_rejected() {
        let json = r#"{"topic":"Genesis","difficulty":"Easy","numQuestions":7}"#;
        assert!(serde_json::from_str::<QuizSettings>(json).is_err());
    }

    #[test]
    fn test_defaults_match_setup_screen() {
        let settings = QuizSettings::default();
        assert_eq!(settings.topic, Topic::Genesis);
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.num_questions.get(), 10);
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(&Difficulty::ALL, Difficulty::Hard, true), Difficulty::Easy);
        assert_eq!(cycle(&Difficulty::ALL, Difficulty::Easy, false), Difficulty::Hard);
        assert_eq!(
            cycle(&QuestionCount::ALL, QuestionCount::Five, true),
            QuestionCount::Ten
        );
    }
}
