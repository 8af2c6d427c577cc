//! Gemini backend.
//!
//! Uses the `generateContent` REST endpoint with a JSON response schema so
//! the model replies with exactly the `{quiz}` / `{lesson}` shape.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::ContentProvider;
use super::schema::{lesson_prompt, lesson_schema, parse_lesson, parse_quiz, quiz_prompt, quiz_schema};
use crate::config::Config;
use crate::models::{Lesson, QuizQuestion, QuizSettings, Topic};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Build from configuration. `None` when no API key is set.
    pub fn from_config(config: &Config) -> Option<reqwest::Result<Self>> {
        let api_key = config.api_key.as_ref()?;
        Some(Self::new(
            api_key.clone(),
            config.model.clone(),
            config.api_base_url.clone(),
            config.request_timeout,
        ))
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send one prompt and return the reply text.
    async fn generate_json(&self, prompt: String, schema: Value) -> anyhow::Result<String> {
        let started = Instant::now();
        let body = request_body(&prompt, schema);

        let response = self
            .http_client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("request to Gemini failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {status}: {body}");
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .context("Gemini reply is not valid JSON")?;

        let text = reply_text(&reply).context("Gemini reply has no text")?;

        info!(
            model = %self.model,
            duration_ms = started.elapsed().as_millis() as u64,
            bytes = text.len(),
            "Generated content"
        );
        Ok(text)
    }
}

fn request_body(prompt: &str, schema: Value) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        }
    })
}

fn reply_text(reply: &GenerateContentResponse) -> Option<String> {
    let content = reply.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.trim().is_empty() { None } else { Some(text) }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate_quiz(&self, settings: &QuizSettings) -> anyhow::Result<Vec<QuizQuestion>> {
        debug!(?settings, "Requesting quiz");
        let text = self.generate_json(quiz_prompt(settings), quiz_schema()).await?;
        parse_quiz(&text)
    }

    async fn generate_lesson(&self, topic: Topic) -> anyhow::Result<Option<Lesson>> {
        debug!(%topic, "Requesting lesson");
        let text = self
            .generate_json(lesson_prompt(topic), lesson_schema())
            .await?;
        parse_lesson(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;
    use crate::models::{Difficulty, QuestionCount, sample_lesson, sample_question};
    use crate::provider::{GenerationError, GenerationRequest, Payload, generate};

    /// Local HTTP server answering every request with one canned response.
    struct StubServer {
        base_url: String,
        last_request: Arc<Mutex<Option<String>>>,
    }

    impl StubServer {
        async fn start(status: u16, body: impl Into<String>, delay: Duration) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let last_request = Arc::new(Mutex::new(None));
            let body = body.into();

            let seen = last_request.clone();
            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let body = body.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        *seen.lock().unwrap() = Some(request);
                        tokio::time::sleep(delay).await;
                        let response = format!(
                            "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\n\
                             content-length: {}\r\nconnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
            });

            Self {
                base_url,
                last_request,
            }
        }

        fn provider(&self, timeout: Duration) -> GeminiProvider {
            GeminiProvider {
                api_key: "test-key".to_string(),
                model: DEFAULT_MODEL.to_string(),
                base_url: self.base_url.clone(),
                http_client: reqwest::Client::builder()
                    .no_proxy()
                    .timeout(timeout)
                    .build()
                    .unwrap(),
            }
        }

        fn last_request(&self) -> String {
            self.last_request.lock().unwrap().clone().unwrap_or_default()
        }
    }

    /// Read headers and a `content-length` body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn candidate_reply(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    fn quiz_request() -> GenerationRequest {
        GenerationRequest::Quiz(QuizSettings::new(
            Topic::Genesis,
            Difficulty::Easy,
            QuestionCount::Five,
        ))
    }

    #[tokio::test]
    async fn test_quiz_reply_is_parsed() {
        let questions = vec![sample_question("Who built the ark?", "Noah")];
        let text = json!({ "quiz": questions }).to_string();
        let server = StubServer::start(200, candidate_reply(&text), Duration::ZERO).await;
        let provider = server.provider(Duration::from_secs(5));

        let payload = generate(&provider, &quiz_request()).await;
        assert_eq!(payload, Ok(Payload::Quiz(questions)));

        let request = server.last_request().to_ascii_lowercase();
        assert!(request.starts_with("post /v1beta/models/gemini-2.5-flash:generatecontent"));
        assert!(request.contains("x-goog-api-key: test-key"));
        assert!(request.contains("\"responsemimetype\":\"application/json\""));
    }

    #[tokio::test]
    async fn test_lesson_reply_is_parsed() {
        let lesson = sample_lesson("Creation");
        let text = json!({ "lesson": lesson }).to_string();
        let server = StubServer::start(200, candidate_reply(&text), Duration::ZERO).await;
        let provider = server.provider(Duration::from_secs(5));

        let payload = generate(&provider, &GenerationRequest::Lesson(Topic::Genesis)).await;
        assert_eq!(payload, Ok(Payload::Lesson(lesson)));
    }

    #[tokio::test]
    async fn test_missing_quiz_key_is_empty_result() {
        let server =
            StubServer::start(200, candidate_reply("{\"other\":1}"), Duration::ZERO).await;
        let provider = server.provider(Duration::from_secs(5));
        assert_eq!(
            generate(&provider, &quiz_request()).await,
            Err(GenerationError::EmptyResult)
        );
    }

    #[tokio::test]
    async fn test_server_error_is_provider_failure() {
        let server = StubServer::start(500, "{\"error\":\"boom\"}", Duration::ZERO).await;
        let provider = server.provider(Duration::from_secs(5));

        let result = generate(&provider, &quiz_request()).await;
        let Err(GenerationError::ProviderFailure(reason)) = result else {
            panic!("expected provider failure, got {result:?}");
        };
        assert!(reason.contains("500"), "{reason}");
    }

    #[tokio::test]
    async fn test_non_json_reply_is_provider_failure() {
        let server = StubServer::start(200, "<html>maintenance</html>", Duration::ZERO).await;
        let provider = server.provider(Duration::from_secs(5));
        assert!(matches!(
            generate(&provider, &quiz_request()).await,
            Err(GenerationError::ProviderFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_question_is_provider_failure() {
        let text = json!({
            "quiz": [{
                "question": "Who?",
                "options": ["A", "B", "C", "D"],
                "answer": "E",
                "reference": "Genesis 1:1"
            }]
        })
        .to_string();
        let server = StubServer::start(200, candidate_reply(&text), Duration::ZERO).await;
        let provider = server.provider(Duration::from_secs(5));
        assert!(matches!(
            generate(&provider, &quiz_request()).await,
            Err(GenerationError::ProviderFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_provider_failure() {
        let text = json!({ "quiz": [sample_question("Who?", "Noah")] }).to_string();
        let server = StubServer::start(200, candidate_reply(&text), Duration::from_secs(5)).await;
        let provider = server.provider(Duration::from_secs(1));

        let started = Instant::now();
        assert!(matches!(
            generate(&provider, &quiz_request()).await,
            Err(GenerationError::ProviderFailure(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_generate_url() {
        let provider = GeminiProvider::new(
            "key",
            DEFAULT_MODEL,
            "https://example.test/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            provider.generate_url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hello", quiz_schema());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["required"], json!(["quiz"]));
    }

    #[test]
    fn test_reply_text_joins_parts() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"quiz\":" }, { "text": "[]}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(reply_text(&reply).as_deref(), Some("{\"quiz\":[]}"));
    }

    #[test]
    fn test_reply_without_candidates() {
        let reply: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(reply_text(&reply), None);

        let reply: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))
                .unwrap();
        assert_eq!(reply_text(&reply), None);
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = Config::default();
        config.api_key = None;
        assert!(GeminiProvider::from_config(&config).is_none());

        config.api_key = Some("secret".to_string());
        assert!(matches!(GeminiProvider::from_config(&config), Some(Ok(_))));
    }
}
