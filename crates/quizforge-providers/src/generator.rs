//! HTTP client for the generative content service.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use quizforge_core::error::GenerationRequestError;
use quizforge_core::traits::{ContentGenerator, GeneratedContent, GenerationRequest};

use crate::error::{from_decode, from_status, from_transport};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Generative content service reached over HTTP.
///
/// POSTs `{subject, topic, level, content_type}` to `/generate_content` and
/// reads `{generated_content}` back. Failures are returned, never retried.
pub struct HttpContentGenerator {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpContentGenerator {
    pub fn new(base_url: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs,
            client,
        })
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(subject = %request.subject, level = %request.level))]
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationRequestError> {
        let start = Instant::now();

        let response = self
            .client
            .post(format!("{}/generate_content", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| from_transport(&e, self.timeout_secs))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(from_status(status, body).into());
        }

        let content: GeneratedContent = response.json().await.map_err(|e| from_decode(&e))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = content.generated_content.len(),
            "generation response received"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizforge_core::error::ServiceError;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            subject: "Databases".into(),
            topic: "Indexes".into(),
            level: "medium".into(),
            content_type: "quiz".into(),
        }
    }

    #[tokio::test]
    async fn successful_generation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generate_content"))
            .and(body_json(serde_json::json!({
                "subject": "Databases",
                "topic": "Indexes",
                "level": "medium",
                "content_type": "quiz"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generated_content": "```json\n{\"questions\": []}\n```"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(Some(server.uri()), 5).unwrap();
        let content = generator.generate(&request()).await.unwrap();
        assert!(content.generated_content.starts_with("```json"));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generate_content"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"generated_content": "x"})),
            )
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(Some(format!("{}/", server.uri())), 5).unwrap();
        assert_eq!(generator.generate(&request()).await.unwrap().generated_content, "x");
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generate_content"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(Some(server.uri()), 5).unwrap();
        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(
            err.0,
            ServiceError::Api {
                status: 500,
                message: "model overloaded".into()
            }
        );
    }

    #[tokio::test]
    async fn client_errors_are_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generate_content"))
            .respond_with(ResponseTemplate::new(401).set_body_string("missing key"))
            .expect(1)
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(Some(server.uri()), 5).unwrap();
        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(err.0, ServiceError::Unauthorized("missing key".into()));
    }

    #[tokio::test]
    async fn missing_generated_content_field() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generate_content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"detail": "ok"})))
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(Some(server.uri()), 5).unwrap();
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err.0, ServiceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_service() {
        // Nothing listens on port 9 of localhost.
        let generator = HttpContentGenerator::new(Some("http://127.0.0.1:9".into()), 5).unwrap();
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err.0, ServiceError::Network(_) | ServiceError::Timeout(_)));
    }
}
