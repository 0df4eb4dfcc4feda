//! Mapping of HTTP failures onto [`ServiceError`].

use quizforge_core::error::ServiceError;

/// Classify a transport-level failure.
pub fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(timeout_secs)
    } else {
        ServiceError::Network(err.to_string())
    }
}

/// Classify an error status (4xx/5xx) together with its response body.
pub fn from_status(status: u16, body: String) -> ServiceError {
    match status {
        401 | 403 => ServiceError::Unauthorized(body),
        404 => ServiceError::NotFound(body),
        _ => ServiceError::Api {
            status,
            message: body,
        },
    }
}

/// Classify a body that could not be decoded.
pub fn from_decode(err: &reqwest::Error) -> ServiceError {
    ServiceError::MalformedResponse(err.to_string())
}
