//! Content pack loaded from a local JSON file.
//!
//! The file uses the same envelope as provider replies, with both keys
//! optional: `{ "quiz": [...], "lesson": { ... } }`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::ContentProvider;
use super::schema::{parse_lesson, parse_quiz};
use crate::models::{Lesson, QuizQuestion, QuizSettings, Topic};

pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read(&self) -> anyhow::Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))
    }
}

#[async_trait]
impl ContentProvider for FileProvider {
    fn name(&self) -> &str {
        "content file"
    }

    async fn generate_quiz(&self, settings: &QuizSettings) -> anyhow::Result<Vec<QuizQuestion>> {
        let text = self.read().await?;
        let mut questions = parse_quiz(&text)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        questions.truncate(settings.num_questions.get());
        debug!(path = %self.path.display(), count = questions.len(), "Loaded quiz from file");
        Ok(questions)
    }

    async fn generate_lesson(&self, topic: Topic) -> anyhow::Result<Option<Lesson>> {
        let text = self.read().await?;
        let lesson = parse_lesson(&text)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        debug!(path = %self.path.display(), %topic, found = lesson.is_some(), "Loaded lesson from file");
        Ok(lesson)
    }
}
