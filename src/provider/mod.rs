//! Content providers.
//!
//! A provider turns quiz settings or a lesson topic into questions. The
//! external contract is loose: a failed call may raise an error or quietly
//! return an empty list / no lesson. [`generate`] folds all of that into a
//! single [`GenerationError`] so the rest of the crate never has to care.

mod file;
mod gemini;
mod schema;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::{Lesson, QuizQuestion, QuizSettings, Topic};

pub use file::FileProvider;
pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiProvider};
pub use schema::{lesson_prompt, parse_lesson, parse_quiz, quiz_prompt};

/// Which kind of content a screen asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Quiz,
    Lesson,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Quiz(QuizSettings),
    Lesson(Topic),
}

impl GenerationRequest {
    pub fn mode(&self) -> Mode {
        match self {
            GenerationRequest::Quiz(_) => Mode::Quiz,
            GenerationRequest::Lesson(_) => Mode::Lesson,
        }
    }
}

/// Successfully generated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Quiz(Vec<QuizQuestion>),
    Lesson(Lesson),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Zero questions or no lesson came back.
    #[error("provider returned no content")]
    EmptyResult,

    /// The request failed or the reply did not have the expected shape.
    #[error("provider request failed: {0}")]
    ProviderFailure(String),
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::EmptyResult => "EMPTY_RESULT",
            GenerationError::ProviderFailure(_) => "PROVIDER_FAILURE",
        }
    }

    /// Text shown inline on the setup screen the request came from.
    pub fn user_message(&self, mode: Mode) -> String {
        let text = match (self, mode) {
            (GenerationError::EmptyResult, Mode::Quiz) => {
                "Failed to generate quiz questions. Please try again."
            }
            (GenerationError::EmptyResult, Mode::Lesson) => {
                "Failed to generate the lesson. Please try again."
            }
            (GenerationError::ProviderFailure(_), Mode::Quiz) => {
                "An error occurred while generating the quiz. Please try again."
            }
            (GenerationError::ProviderFailure(_), Mode::Lesson) => {
                "An error occurred while generating the lesson. Please try again."
            }
        };
        text.to_string()
    }
}

/// A source of quiz questions and lessons.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// May return an empty list on failure instead of an error.
    async fn generate_quiz(&self, settings: &QuizSettings) -> anyhow::Result<Vec<QuizQuestion>>;

    /// May return `None` on failure instead of an error.
    async fn generate_lesson(&self, topic: Topic) -> anyhow::Result<Option<Lesson>>;
}

/// Run one request against `provider` and normalize the outcome.
pub async fn generate(
    provider: &dyn ContentProvider,
    request: &GenerationRequest,
) -> Result<Payload, GenerationError> {
    match request {
        GenerationRequest::Quiz(settings) => match provider.generate_quiz(settings).await {
            Ok(questions) if questions.is_empty() => Err(GenerationError::EmptyResult),
            Ok(questions) => {
                if questions.len() != settings.num_questions.get() {
                    warn!(
                        provider = provider.name(),
                        requested = settings.num_questions.get(),
                        received = questions.len(),
                        "Question count differs from request"
                    );
                }
                Ok(Payload::Quiz(questions))
            }
            Err(e) => {
                error!(provider = provider.name(), error = %e, "Error generating quiz");
                Err(GenerationError::ProviderFailure(e.to_string()))
            }
        },
        GenerationRequest::Lesson(topic) => match provider.generate_lesson(*topic).await {
            Ok(Some(lesson)) => Ok(Payload::Lesson(lesson)),
            Ok(None) => Err(GenerationError::EmptyResult),
            Err(e) => {
                error!(provider = provider.name(), error = %e, "Error generating lesson");
                Err(GenerationError::ProviderFailure(e.to_string()))
            }
        },
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeProvider;
    use super::*;
    use crate::models::{sample_lesson, sample_question};

    fn provider(
        quiz: Result<Vec<QuizQuestion>, String>,
        lesson: Result<Option<Lesson>, String>,
    ) -> FakeProvider {
        FakeProvider { quiz, lesson }
    }

    #[tokio::test]
    async fn test_empty_quiz_is_empty_result() {
        let p = provider(Ok(Vec::new()), Ok(None));
        let result = generate(&p, &GenerationRequest::Quiz(QuizSettings::default())).await;
        assert_eq!(result, Err(GenerationError::EmptyResult));
    }

    #[tokio::test]
    async fn test_quiz_error_is_provider_failure() {
        let p = provider(Err("quota exceeded".to_string()), Ok(None));
        let result = generate(&p, &GenerationRequest::Quiz(QuizSettings::default())).await;
        assert_eq!(
            result,
            Err(GenerationError::ProviderFailure("quota exceeded".to_string()))
        );
    }

    #[tokio::test]
    async fn test_quiz_payload() {
        let questions = vec![sample_question("Who built the ark?", "Noah")];
        let p = provider(Ok(questions.clone()), Ok(None));
        let result = generate(&p, &GenerationRequest::Quiz(QuizSettings::default())).await;
        assert_eq!(result, Ok(Payload::Quiz(questions)));
    }

    #[tokio::test]
    async fn test_null_lesson_is_empty_result() {
        let p = provider(Ok(Vec::new()), Ok(None));
        let result = generate(&p, &GenerationRequest::Lesson(Topic::Exodus)).await;
        assert_eq!(result, Err(GenerationError::EmptyResult));
    }

    #[tokio::test]
    async fn test_lesson_payload() {
        let lesson = sample_lesson("Creation");
        let p = provider(Ok(Vec::new()), Ok(Some(lesson.clone())));
        let result = generate(&p, &GenerationRequest::Lesson(Topic::Genesis)).await;
        assert_eq!(result, Ok(Payload::Lesson(lesson)));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(GenerationError::EmptyResult.code(), "EMPTY_RESULT");
        assert_eq!(
            GenerationError::ProviderFailure(String::new()).code(),
            "PROVIDER_FAILURE"
        );
        assert_eq!(
            GenerationError::EmptyResult.user_message(Mode::Quiz),
            "Failed to generate quiz questions. Please try again."
        );
        assert_eq!(
            GenerationError::ProviderFailure("x".into()).user_message(Mode::Lesson),
            "An error occurred while generating the lesson. Please try again."
        );
    }
}
