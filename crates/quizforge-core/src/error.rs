//! Error types shared by the attempt pipeline and its collaborators.
//!
//! Parse and per-question validation failures never appear here: the
//! normalizer and builder absorb them locally. What remains are the failures
//! a caller can observe, either from a collaborator or from feeding the
//! state machine an event it cannot accept.

use thiserror::Error;

/// Transport-level failure talking to a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with an error status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Retrieving quiz metadata failed (network, auth, or not-found).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch quiz '{quiz_id}': {source}")]
pub struct MetadataFetchError {
    pub quiz_id: String,
    #[source]
    pub source: ServiceError,
}

impl MetadataFetchError {
    pub fn new(quiz_id: impl Into<String>, source: ServiceError) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            source,
        }
    }
}

/// Calling the generative content service failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("content generation failed: {0}")]
pub struct GenerationRequestError(#[from] pub ServiceError);

/// Errors surfaced by an attempt session.
///
/// The first three variants are terminal and are stored in
/// [`AttemptState::Error`](crate::session::AttemptState::Error). The rest
/// reject a single event and leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error(transparent)]
    MetadataFetch(#[from] MetadataFetchError),

    #[error(transparent)]
    GenerationRequest(#[from] GenerationRequestError),

    /// The generated content held no usable question.
    #[error("generated content did not contain any usable question")]
    GenerationContentInvalid,

    #[error("cannot {event} while session is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("question position {position} is out of range ({total} questions)")]
    QuestionOutOfRange { position: usize, total: usize },
}

impl AttemptError {
    /// Returns `true` if the error ended the session rather than rejecting an event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptError::MetadataFetch(_)
                | AttemptError::GenerationRequest(_)
                | AttemptError::GenerationContentInvalid
        )
    }
}
