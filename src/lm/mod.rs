//! Text-generation backends.
//!
//! The pipeline only needs `generate(prompt) -> text`. Which backend answers is
//! a configuration concern: a user-supplied command that reads the prompt on
//! stdin, or an HTTP chat endpoint.
//!
//! # Configuration
//!
//! A backend is described by a tagged JSON object:
//!
//! ```json
//! {"kind": "command", "command": "llm -m haiku"}
//! {"kind": "anthropic", "model": "claude-3-5-haiku-20241022"}
//! {"kind": "openai_compatible", "model": "llama-3.3-70b-versatile",
//!  "api_base": "https://api.groq.com/openai/v1", "api_key_env": "GROQ_API_KEY"}
//! ```
mod command;
mod http;
#[cfg(test)]
pub(crate) mod scripted;

pub use command::CommandGenerator;
pub use http::{ApiMode, HttpGenerator, HttpSettings};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default model for the Anthropic backend.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";

/// The external text generator collaborator.
///
/// Implementations must either fail or return text; timeouts are their own
/// responsibility.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Short human-readable backend description for logs.
    fn label(&self) -> &str;
}

/// Backend selection as written in config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    Command { command: String },
    Anthropic(HttpSettings),
    OpenaiCompatible(HttpSettings),
}

impl GeneratorConfig {
    /// Backend used when neither the CLI, the config file, nor the
    /// environment names one.
    pub fn default_backend() -> Self {
        GeneratorConfig::Anthropic(HttpSettings::with_model(DEFAULT_ANTHROPIC_MODEL))
    }

    pub fn command(command: impl Into<String>) -> Self {
        GeneratorConfig::Command {
            command: command.into(),
        }
    }
}

/// Instantiate the backend described by `config`.
pub fn build_generator(config: &GeneratorConfig) -> Result<Box<dyn TextGenerator>> {
    let generator: Box<dyn TextGenerator> = match config {
        GeneratorConfig::Command { command } => Box::new(CommandGenerator::new(command)?),
        GeneratorConfig::Anthropic(settings) => {
            Box::new(HttpGenerator::new(ApiMode::Anthropic, settings)?)
        }
        GeneratorConfig::OpenaiCompatible(settings) => {
            Box::new(HttpGenerator::new(ApiMode::ChatCompletions, settings)?)
        }
    };
    tracing::debug!(backend = generator.label(), "generator ready");
    Ok(generator)
}
