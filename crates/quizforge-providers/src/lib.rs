//! quizforge-providers — HTTP collaborators for quiz attempts.
//!
//! Implements `QuizMetaStore` and `ContentGenerator` over HTTP, plus the
//! TOML configuration that wires them into an `AttemptRunner`.

pub mod config;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod mock;

pub use config::{load_config, load_config_from, QuizforgeConfig};
pub use generator::HttpContentGenerator;
pub use metadata::HttpQuizMetaStore;
