//! HTTP client for the quiz metadata store.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::instrument;

use quizforge_core::error::MetadataFetchError;
use quizforge_core::model::{Difficulty, QuizMeta};
use quizforge_core::traits::QuizMetaStore;

use crate::error::{from_decode, from_status, from_transport};

pub const DEFAULT_QUIZ_PATH: &str = "/api/aquizzes/a/{id}";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Quiz metadata store reached over HTTP.
///
/// Note: Custom Debug impl masks the bearer token.
pub struct HttpQuizMetaStore {
    base_url: Url,
    quiz_path: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpQuizMetaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpQuizMetaStore")
            .field("base_url", &self.base_url.as_str())
            .field("quiz_path", &self.quiz_path)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl HttpQuizMetaStore {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid metadata base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("metadata base URL cannot carry a path: {base_url}");
        }

        Ok(Self {
            base_url,
            quiz_path: DEFAULT_QUIZ_PATH.to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        })
    }

    /// Override the path template; `{id}` is replaced by the quiz id.
    pub fn with_quiz_path(mut self, quiz_path: impl Into<String>) -> Self {
        self.quiz_path = quiz_path.into();
        self
    }

    /// Expand the path template onto the base URL. Each template segment is
    /// percent-encoded, so an id cannot add segments, a query or a fragment.
    fn quiz_url(&self, quiz_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in self.quiz_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(&segment.replace("{id}", quiz_id));
            }
        }
        url
    }
}

/// Wire shape of a quiz document; the store uses Mongo-style `_id`.
#[derive(Deserialize)]
struct QuizDocument {
    #[serde(alias = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

impl From<QuizDocument> for QuizMeta {
    fn from(doc: QuizDocument) -> Self {
        QuizMeta {
            id: doc.id,
            title: doc.title,
            difficulty: doc
                .difficulty
                .as_deref()
                .map(Difficulty::from)
                .unwrap_or(Difficulty::Medium),
            topic: doc.topic,
        }
    }
}

#[async_trait]
impl QuizMetaStore for HttpQuizMetaStore {
    #[instrument(skip(self))]
    async fn fetch_meta(&self, quiz_id: &str) -> Result<QuizMeta, MetadataFetchError> {
        let fail = |source| MetadataFetchError::new(quiz_id, source);

        let mut req = self.client.get(self.quiz_url(quiz_id));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|e| fail(from_transport(&e, DEFAULT_TIMEOUT_SECS)))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(fail(from_status(status, body)));
        }

        let doc: QuizDocument = response.json().await.map_err(|e| fail(from_decode(&e)))?;
        Ok(doc.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizforge_core::error::ServiceError;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_mongo_style_document() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/aquizzes/a/abc123"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "abc123",
                "title": "Operating Systems",
                "difficulty": "Hard",
                "createdBy": "someone"
            })))
            .mount(&server)
            .await;

        let store = HttpQuizMetaStore::new(&server.uri(), Some("secret".into())).unwrap();
        let meta = store.fetch_meta("abc123").await.unwrap();
        assert_eq!(meta.id, "abc123");
        assert_eq!(meta.title, "Operating Systems");
        assert_eq!(meta.difficulty, Difficulty::Hard);
        assert_eq!(meta.topic, None);
    }

    #[tokio::test]
    async fn custom_path_and_missing_difficulty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quizzes/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "7",
                "title": "Graphs",
                "topic": "Shortest paths"
            })))
            .mount(&server)
            .await;

        let store = HttpQuizMetaStore::new(&server.uri(), None)
            .unwrap()
            .with_quiz_path("/quizzes/{id}");
        let meta = store.fetch_meta("7").await.unwrap();
        assert_eq!(meta.difficulty, Difficulty::Medium);
        assert_eq!(meta.effective_topic(), "Shortest paths");
    }

    #[tokio::test]
    async fn not_found_and_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/aquizzes/a/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Quiz not found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/aquizzes/a/locked"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let store = HttpQuizMetaStore::new(&server.uri(), None).unwrap();

        let err = store.fetch_meta("missing").await.unwrap_err();
        assert_eq!(err.quiz_id, "missing");
        assert_eq!(err.source, ServiceError::NotFound("Quiz not found".into()));

        let err = store.fetch_meta("locked").await.unwrap_err();
        assert!(matches!(err.source, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn malformed_document() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/aquizzes/a/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let store = HttpQuizMetaStore::new(&server.uri(), None).unwrap();
        let err = store.fetch_meta("1").await.unwrap_err();
        assert!(matches!(err.source, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn quiz_id_is_a_single_path_segment() {
        let store = HttpQuizMetaStore::new("http://localhost:5000/", None).unwrap();
        assert_eq!(
            store.quiz_url("abc123").as_str(),
            "http://localhost:5000/api/aquizzes/a/abc123"
        );
        assert_eq!(
            store.quiz_url("a/b?c#d").as_str(),
            "http://localhost:5000/api/aquizzes/a/a%2Fb%3Fc%23d"
        );

        let prefixed = HttpQuizMetaStore::new("http://localhost/quizzes-api", None)
            .unwrap()
            .with_quiz_path("/q/{id}/meta");
        assert_eq!(
            prefixed.quiz_url("7").as_str(),
            "http://localhost/quizzes-api/q/7/meta"
        );
    }

    #[tokio::test]
    async fn reserved_characters_in_id_stay_in_the_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/aquizzes/a/x%2Fy%3F"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "x/y?",
                "title": "Escaping"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpQuizMetaStore::new(&server.uri(), None).unwrap();
        let meta = store.fetch_meta("x/y?").await.unwrap();
        assert_eq!(meta.id, "x/y?");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(HttpQuizMetaStore::new("not a url", None).is_err());
        assert!(HttpQuizMetaStore::new("mailto:quiz@example.com", None).is_err());
    }

    #[test]
    fn debug_masks_token() {
        let store = HttpQuizMetaStore::new("http://localhost", Some("secret".into())).unwrap();
        let debug = format!("{store:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("***"));
    }
}
