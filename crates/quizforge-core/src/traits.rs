//! Collaborator traits for the quiz metadata store and the generative
//! content service.
//!
//! These async traits are implemented by the `quizforge-providers` crate.
//! The attempt state machine never calls them directly; the
//! [`AttemptRunner`](crate::runner::AttemptRunner) does, and feeds the
//! results back into the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationRequestError, MetadataFetchError};
use crate::model::QuizMeta;

// ---------------------------------------------------------------------------
// Quiz metadata store
// ---------------------------------------------------------------------------

/// Source of quiz metadata.
#[async_trait]
pub trait QuizMetaStore: Send + Sync {
    /// Fetch the metadata of one quiz.
    async fn fetch_meta(&self, quiz_id: &str) -> Result<QuizMeta, MetadataFetchError>;
}

// ---------------------------------------------------------------------------
// Generative content service
// ---------------------------------------------------------------------------

/// Default content type requested from the generative service.
pub const DEFAULT_CONTENT_TYPE: &str = "quiz";

/// Backend that produces raw quiz text.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Issue one generation request. Implementations must not retry.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationRequestError>;
}

/// Request sent to the generative content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subject: String,
    pub topic: String,
    pub level: String,
    pub content_type: String,
}

impl GenerationRequest {
    /// Request key for a quiz: subject is the title, topic falls back to the title.
    pub fn for_quiz(meta: &QuizMeta, content_type: &str) -> Self {
        Self {
            subject: meta.title.clone(),
            topic: meta.effective_topic().to_string(),
            level: meta.difficulty.to_string(),
            content_type: content_type.to_string(),
        }
    }
}

/// Response of the generative content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Raw, untrusted text; the sole input to normalization.
    pub generated_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    #[test]
    fn request_for_quiz_uses_title_as_subject() {
        let meta = QuizMeta {
            id: "42".into(),
            title: "Networking".into(),
            difficulty: Difficulty::Hard,
            topic: None,
        };
        let request = GenerationRequest::for_quiz(&meta, DEFAULT_CONTENT_TYPE);
        assert_eq!(request.subject, "Networking");
        assert_eq!(request.topic, "Networking");
        assert_eq!(request.level, "hard");
        assert_eq!(request.content_type, "quiz");
    }

    #[test]
    fn request_serializes_with_snake_case_keys() {
        let request = GenerationRequest {
            subject: "s".into(),
            topic: "t".into(),
            level: "easy".into(),
            content_type: "quiz".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["content_type"], "quiz");
    }
}
