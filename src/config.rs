//! Run configuration.
//!
//! Settings come from an optional JSON file and are then overridden by CLI
//! flags. Generator backends fall back to environment commands and finally to
//! the hosted default.
use crate::lm::GeneratorConfig;
use crate::workflow::QuestionLimits;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const LM_COMMAND_ENV: &str = "FAQGEN_LM_COMMAND";
pub const COMPARISON_LM_COMMAND_ENV: &str = "FAQGEN_COMPARISON_LM_COMMAND";

const CONFIG_DIR: &str = "faqgen";
const CONFIG_FILE: &str = "config.json";

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_min_required_questions() -> usize {
    QuestionLimits::default().min_required_questions
}

fn default_max_question_generation_attempts() -> u32 {
    QuestionLimits::default().max_question_generation_attempts
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_min_required_questions")]
    pub min_required_questions: usize,
    #[serde(default = "default_max_question_generation_attempts")]
    pub max_question_generation_attempts: u32,
    /// Ask the answer backend for extra question variants.
    #[serde(default)]
    pub expand_questions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_generator: Option<GeneratorConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            min_required_questions: default_min_required_questions(),
            max_question_generation_attempts: default_max_question_generation_attempts(),
            expand_questions: false,
            generator: None,
            comparison_generator: None,
        }
    }
}

impl RunConfig {
    pub fn limits(&self) -> QuestionLimits {
        QuestionLimits {
            min_required_questions: self.min_required_questions,
            max_question_generation_attempts: self.max_question_generation_attempts,
        }
    }
}

/// Flag values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub min_questions: Option<usize>,
    pub max_attempts: Option<u32>,
    pub expand_questions: bool,
    pub lm: Option<String>,
    pub comparison_lm: Option<String>,
}

/// Backends chosen for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBackends {
    pub answers: GeneratorConfig,
    pub comparisons: GeneratorConfig,
}

/// Per-user config location, e.g. `~/.config/faqgen/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: RunConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Resolve the effective config: explicit path, then the per-user file when it
/// exists, then defaults. Overrides are applied last.
pub fn resolve_config(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<RunConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => load_config(&path)?,
            _ => RunConfig::default(),
        },
    };
    apply_overrides(&mut config, overrides);
    validate_config(&config)?;
    Ok(config)
}

pub fn apply_overrides(config: &mut RunConfig, overrides: &ConfigOverrides) {
    if let Some(min) = overrides.min_questions {
        config.min_required_questions = min;
    }
    if let Some(max) = overrides.max_attempts {
        config.max_question_generation_attempts = max;
    }
    if overrides.expand_questions {
        config.expand_questions = true;
    }
    if let Some(command) = &overrides.lm {
        config.generator = Some(GeneratorConfig::command(command.as_str()));
    }
    if let Some(command) = &overrides.comparison_lm {
        config.comparison_generator = Some(GeneratorConfig::command(command.as_str()));
    }
}

pub fn validate_config(config: &RunConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.max_question_generation_attempts == 0 {
        return Err(anyhow!("max_question_generation_attempts must be at least 1"));
    }
    for (label, backend) in [
        ("generator", &config.generator),
        ("comparison_generator", &config.comparison_generator),
    ] {
        if let Some(GeneratorConfig::Command { command }) = backend {
            if command.trim().is_empty() {
                return Err(anyhow!("{label} command must not be empty"));
            }
        }
    }
    Ok(())
}

/// Choose backends using the process environment.
pub fn resolve_backends(config: &RunConfig) -> ResolvedBackends {
    resolve_backends_with(config, |name| std::env::var(name).ok())
}

/// Choose backends with an injectable environment lookup.
pub fn resolve_backends_with(
    config: &RunConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ResolvedBackends {
    let env_command = |name: &str| {
        lookup(name)
            .filter(|command| !command.trim().is_empty())
            .map(GeneratorConfig::command)
    };
    let answers = config
        .generator
        .clone()
        .or_else(|| env_command(LM_COMMAND_ENV))
        .unwrap_or_else(GeneratorConfig::default_backend);
    let comparisons = config
        .comparison_generator
        .clone()
        .or_else(|| env_command(COMPARISON_LM_COMMAND_ENV))
        .unwrap_or_else(|| answers.clone());
    ResolvedBackends {
        answers,
        comparisons,
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
