//! Service configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::runner::AttemptRunner;
use quizforge_core::traits::DEFAULT_CONTENT_TYPE;

use crate::generator::{HttpContentGenerator, DEFAULT_TIMEOUT_SECS};
use crate::metadata::{HttpQuizMetaStore, DEFAULT_QUIZ_PATH};

/// Where quiz metadata comes from.
///
/// Note: Custom Debug impl masks the token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_url")]
    pub base_url: String,
    /// Path template; `{id}` is replaced by the quiz id.
    #[serde(default = "default_quiz_path")]
    pub quiz_path: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for MetadataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataConfig")
            .field("base_url", &self.base_url)
            .field("quiz_path", &self.quiz_path)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metadata_url(),
            quiz_path: default_quiz_path(),
            token: None,
        }
    }
}

/// Where quiz content is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_url")]
    pub base_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_generator_url(),
            content_type: default_content_type(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_metadata_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_quiz_path() -> String {
    DEFAULT_QUIZ_PATH.to_string()
}
fn default_generator_url() -> String {
    crate::generator::DEFAULT_BASE_URL.to_string()
}
fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim; a `${...}` inside a value is not
/// expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

impl QuizforgeConfig {
    fn resolve_env(mut self) -> Self {
        self.metadata.base_url = resolve_env_vars(&self.metadata.base_url);
        self.metadata.token = self
            .metadata
            .token
            .as_deref()
            .map(resolve_env_vars)
            .filter(|t| !t.is_empty());
        self.generator.base_url = resolve_env_vars(&self.generator.base_url);
        self
    }

    /// Build a runner wired to the configured HTTP services.
    pub fn create_runner(&self) -> Result<AttemptRunner> {
        let store = HttpQuizMetaStore::new(&self.metadata.base_url, self.metadata.token.clone())?
            .with_quiz_path(self.metadata.quiz_path.clone());
        let generator = HttpContentGenerator::new(
            Some(self.generator.base_url.clone()),
            self.generator.timeout_secs,
        )?;
        Ok(AttemptRunner::new(Arc::new(store), Arc::new(generator)))
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// Environment variable overrides: `QUIZFORGE_TOKEN`, `QUIZFORGE_METADATA_URL`,
/// `QUIZFORGE_GENERATOR_URL`.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizforgeConfig::default(),
    };

    // Apply env var overrides
    if let Ok(token) = std::env::var("QUIZFORGE_TOKEN") {
        config.metadata.token = Some(token);
    }
    if let Ok(url) = std::env::var("QUIZFORGE_METADATA_URL") {
        config.metadata.base_url = url;
    }
    if let Ok(url) = std::env::var("QUIZFORGE_GENERATOR_URL") {
        config.generator.base_url = url;
    }

    Ok(config.resolve_env())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}
