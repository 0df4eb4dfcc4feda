//! Mock collaborators for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizforge_core::error::{GenerationRequestError, MetadataFetchError, ServiceError};
use quizforge_core::model::QuizMeta;
use quizforge_core::traits::{
    ContentGenerator, GeneratedContent, GenerationRequest, QuizMetaStore,
};

/// A mock generative service for driving sessions without real API calls.
pub struct MockGenerator {
    /// Either the text to return or the failure to report.
    response: Result<String, ServiceError>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerator {
    /// Create a mock that always returns the same raw text.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing(error: ServiceError) -> Self {
        Self {
            response: Err(error),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this generator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this generator.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationRequestError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        self.response
            .clone()
            .map(|generated_content| GeneratedContent { generated_content })
            .map_err(GenerationRequestError)
    }
}

/// An in-memory metadata store.
#[derive(Default)]
pub struct MockMetaStore {
    quizzes: HashMap<String, QuizMeta>,
}

impl MockMetaStore {
    pub fn new(quizzes: impl IntoIterator<Item = QuizMeta>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }
}

#[async_trait]
impl QuizMetaStore for MockMetaStore {
    async fn fetch_meta(&self, quiz_id: &str) -> Result<QuizMeta, MetadataFetchError> {
        self.quizzes.get(quiz_id).cloned().ok_or_else(|| {
            MetadataFetchError::new(quiz_id, ServiceError::NotFound(format!("quiz {quiz_id}")))
        })
    }
}
