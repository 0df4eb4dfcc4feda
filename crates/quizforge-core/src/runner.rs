//! Async driver for attempt sessions.
//!
//! Performs the collaborator calls a session asks for and feeds each result
//! back tagged with the epoch of the ticket that requested it.

use std::sync::Arc;

use crate::error::AttemptError;
use crate::session::{AttemptSession, AttemptState};
use crate::traits::{ContentGenerator, QuizMetaStore};

/// Drives a session through metadata fetch and generation.
pub struct AttemptRunner {
    store: Arc<dyn QuizMetaStore>,
    generator: Arc<dyn ContentGenerator>,
}

impl AttemptRunner {
    pub fn new(store: Arc<dyn QuizMetaStore>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { store, generator }
    }

    /// Take a fresh session to Ready, or return the error that ended it.
    pub async fn prepare(&self, session: &mut AttemptSession) -> Result<(), AttemptError> {
        let ticket = session.begin()?;
        tracing::debug!(quiz_id = %ticket.quiz_id, epoch = %ticket.epoch, "fetching quiz metadata");
        let result = self.store.fetch_meta(&ticket.quiz_id).await;
        session.apply_meta(ticket.epoch, result);

        self.generate(session).await;

        match session.state() {
            AttemptState::Ready => Ok(()),
            AttemptState::Error(err) => Err(err.clone()),
            other => Err(AttemptError::InvalidTransition {
                state: other.name(),
                event: "prepare",
            }),
        }
    }

    /// Trigger the session's generation request.
    ///
    /// Returns `false` without contacting the service when the session is
    /// not waiting for content or has already dispatched its request.
    pub async fn generate(&self, session: &mut AttemptSession) -> bool {
        let Some(ticket) = session.dispatch_generation() else {
            return false;
        };
        tracing::debug!(
            generator = self.generator.name(),
            subject = %ticket.request.subject,
            level = %ticket.request.level,
            "requesting quiz content"
        );
        let result = self.generator.generate(&ticket.request).await;
        session.apply_generation(ticket.epoch, result);
        true
    }
}
