//! Core data model types for quizforge.
//!
//! These are the canonical shapes every component agrees on, independent of
//! whichever field-naming variant the generative service happened to use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata for a quiz, as returned by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMeta {
    /// Store identifier.
    pub id: String,
    /// Human-readable title; doubles as the generation subject.
    pub title: String,
    /// Requested difficulty level.
    pub difficulty: Difficulty,
    /// Optional topic; the title is used when absent.
    #[serde(default)]
    pub topic: Option<String>,
}

impl QuizMeta {
    /// Topic to request content for.
    pub fn effective_topic(&self) -> &str {
        self.topic
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
    }
}

/// Difficulty level of a quiz.
///
/// Unknown labels are preserved verbatim so they round-trip to the
/// generative service unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl From<&str> for Difficulty {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "easy" | "beginner" => Difficulty::Easy,
            "medium" | "intermediate" => Difficulty::Medium,
            "hard" | "advanced" => Difficulty::Hard,
            _ => Difficulty::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        Difficulty::from(s.as_str())
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        d.to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::Other(label) => write!(f, "{label}"),
        }
    }
}

/// A validated multiple-choice question.
///
/// `correct_answer_text` always equals one element of `options`, and
/// `options` holds at least two distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalQuestion {
    pub id: String,
    pub prompt_text: String,
    pub options: Vec<String>,
    pub correct_answer_text: String,
}

/// Follow-up difficulty suggestion after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Easier,
    Harder,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Easier => write!(f, "easier"),
            Recommendation::Harder => write!(f, "harder"),
        }
    }
}

/// Per-question outcome of a scored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// Zero-based question position.
    pub position: usize,
    pub prompt_text: String,
    /// What was selected, if anything.
    pub selected: Option<String>,
    pub correct_answer_text: String,
    pub is_correct: bool,
}
