//! Prompts, response schemas and reply parsing shared by providers.
//!
//! Replies must be `{ "quiz": [...] }` or `{ "lesson": { title, content, exam } }`.
//! A well-formed object that lacks the key parses as "no content"; anything
//! else that deviates from the shape is an error.

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::models::{EXAM_LENGTH, Lesson, NUM_OPTIONS, QuizQuestion, QuizSettings, Topic};

#[derive(Deserialize)]
struct QuizEnvelope {
    quiz: Option<Vec<QuizQuestion>>,
}

#[derive(Deserialize)]
struct LessonEnvelope {
    lesson: Option<Lesson>,
}

pub fn quiz_prompt(settings: &QuizSettings) -> String {
    format!(
        "Generate a Bible quiz with {count} questions.\n\
         Topic: {topic}\n\
         Difficulty: {difficulty}\n\n\
         Each question must have exactly {NUM_OPTIONS} multiple-choice options.\n\
         One of the options must be the correct answer.\n\
         Provide the Bible reference for each question's answer.\n\
         Return the result as a JSON object.",
        count = settings.num_questions,
        topic = settings.topic,
        difficulty = settings.difficulty,
    )
}

pub fn lesson_prompt(topic: Topic) -> String {
    format!(
        "Generate a concise Bible lesson on the topic of \"{topic}\".\n\
         The lesson should include a title and the content broken down into multiple paragraphs (as an array of strings).\n\
         After the lesson, create a {EXAM_LENGTH}-question multiple-choice exam based strictly on the lesson's content.\n\
         Each exam question must have exactly {NUM_OPTIONS} options, one correct answer, and a Bible reference.\n\
         Return the entire result as a single JSON object."
    )
}

fn question_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "question": { "type": "STRING", "description": "The quiz question." },
            "options": {
                "type": "ARRAY",
                "description": "An array of 4 multiple-choice options.",
                "items": { "type": "STRING" }
            },
            "answer": {
                "type": "STRING",
                "description": "The correct answer, which must be one of the provided options."
            },
            "reference": {
                "type": "STRING",
                "description": "The Bible book, chapter, and verse where the answer can be found (e.g., \"John 3:16\")."
            }
        },
        "required": ["question", "options", "answer", "reference"]
    })
}

pub(crate) fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "quiz": {
                "type": "ARRAY",
                "description": "An array of quiz questions.",
                "items": question_schema()
            }
        },
        "required": ["quiz"]
    })
}

pub(crate) fn lesson_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lesson": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING", "description": "The title of the lesson." },
                    "content": {
                        "type": "ARRAY",
                        "description": "An array of strings, where each string is a paragraph of the lesson.",
                        "items": { "type": "STRING" }
                    },
                    "exam": {
                        "type": "ARRAY",
                        "description": "An array of 5 quiz questions based on the lesson content.",
                        "items": question_schema()
                    }
                },
                "required": ["title", "content", "exam"]
            }
        },
        "required": ["lesson"]
    })
}

/// Parse a quiz reply. A missing `quiz` key yields an empty list.
pub fn parse_quiz(text: &str) -> anyhow::Result<Vec<QuizQuestion>> {
    let envelope: QuizEnvelope =
        serde_json::from_str(text.trim()).context("quiz reply is not the expected JSON shape")?;

    let questions = envelope.quiz.unwrap_or_default();
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .with_context(|| format!("quiz question {} is malformed", index + 1))?;
    }

    Ok(questions)
}

/// Parse a lesson reply. A missing `lesson` key yields `None`.
pub fn parse_lesson(text: &str) -> anyhow::Result<Option<Lesson>> {
    let envelope: LessonEnvelope =
        serde_json::from_str(text.trim()).context("lesson reply is not the expected JSON shape")?;

    if let Some(lesson) = &envelope.lesson {
        lesson.validate().context("lesson is malformed")?;
    }

    Ok(envelope.lesson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, QuestionCount, sample_lesson, sample_question};

    #[test]
    fn test_quiz_prompt_mentions_settings() {
        let prompt = quiz_prompt(&QuizSettings::new(
            Topic::TheProphets,
            Difficulty::Hard,
            QuestionCount::Twenty,
        ));
        assert!(prompt.contains("20 questions"));
        assert!(prompt.contains("Topic: The Prophets"));
        assert!(prompt.contains("Difficulty: Hard"));
    }

    #[test]
    fn test_lesson_prompt_mentions_topic() {
        let prompt = lesson_prompt(Topic::PaulsLetters);
        assert!(prompt.contains("\"Paul's Letters\""));
        assert!(prompt.contains("5-question"));
    }

    #[test]
    fn test_parse_quiz() {
        let questions = vec![sample_question("Who built the ark?", "Noah")];
        let text = serde_json::to_string(&json!({ "quiz": questions })).unwrap();
        assert_eq!(parse_quiz(&text).unwrap(), questions);
    }

    #[test]
    fn test_parse_quiz_missing_key_is_empty() {
        assert!(parse_quiz(r#"{"questions": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_quiz_rejects_bad_json() {
        assert!(parse_quiz("not json").is_err());
        assert!(parse_quiz(r#"{"quiz": [{"question": "q"}]}"#).is_err());
    }

    #[test]
    fn test_parse_quiz_rejects_invalid_question() {
        let mut question = sample_question("Who built the ark?", "Noah");
        question.answer = "Jonah".to_string();
        let text = serde_json::to_string(&json!({ "quiz": [question] })).unwrap();
        assert!(parse_quiz(&text).is_err());
    }

    #[test]
    fn test_parse_lesson() {
        let lesson = sample_lesson("Creation");
        let text = serde_json::to_string(&json!({ "lesson": lesson })).unwrap();
        assert_eq!(parse_lesson(&text).unwrap(), Some(lesson));
        assert_eq!(parse_lesson("{}").unwrap(), None);
    }

    #[test]
    fn test_schemas_require_top_level_key() {
        assert_eq!(quiz_schema()["required"], json!(["quiz"]));
        assert_eq!(lesson_schema()["required"], json!(["lesson"]));
        assert_eq!(
            lesson_schema()["properties"]["lesson"]["properties"]["exam"]["items"]["required"],
            json!(["question", "options", "answer", "reference"])
        );
    }
}
