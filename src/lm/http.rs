//! HTTP chat backends (Anthropic Messages and OpenAI-compatible chat completions).
use super::TextGenerator;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::time::{Duration, Instant};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiMode {
    Anthropic,
    ChatCompletions,
}

impl ApiMode {
    fn default_api_base(self) -> &'static str {
        match self {
            ApiMode::Anthropic => "https://api.anthropic.com/v1",
            ApiMode::ChatCompletions => "https://api.openai.com/v1",
        }
    }

    fn default_key_env(self) -> &'static str {
        match self {
            ApiMode::Anthropic => "ANTHROPIC_API_KEY",
            ApiMode::ChatCompletions => "OPENAI_API_KEY",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            ApiMode::Anthropic => "messages",
            ApiMode::ChatCompletions => "chat/completions",
        }
    }
}

/// Settings shared by both HTTP modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f64 {
    0.3
}

fn default_timeout_secs() -> u64 {
    60
}

impl HttpSettings {
    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            api_base: None,
            api_key_env: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub struct HttpGenerator {
    agent: ureq::Agent,
    mode: ApiMode,
    url: String,
    api_key: String,
    settings: HttpSettings,
    label: String,
}

impl HttpGenerator {
    /// Build a client; fails when the API key variable is unset.
    pub fn new(mode: ApiMode, settings: &HttpSettings) -> Result<Self> {
        let key_env = settings
            .api_key_env
            .as_deref()
            .unwrap_or(mode.default_key_env());
        let api_key = env::var(key_env)
            .with_context(|| format!("{key_env} not found in environment"))?;
        let api_base = settings
            .api_base
            .as_deref()
            .unwrap_or(mode.default_api_base())
            .trim_end_matches('/');
        let url = format!("{api_base}/{}", mode.endpoint());
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .build()
            .into();
        Ok(Self {
            agent,
            mode,
            label: format!("{} ({url})", settings.model),
            url,
            api_key,
            settings: settings.clone(),
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        let messages = json!([{ "role": "user", "content": prompt }]);
        json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "messages": messages,
        })
    }
}

impl TextGenerator for HttpGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let body = self.request_body(prompt);
        let request = self.agent.post(self.url.as_str());
        let request = match self.mode {
            ApiMode::Anthropic => request
                .header("x-api-key", self.api_key.as_str())
                .header("anthropic-version", ANTHROPIC_VERSION),
            ApiMode::ChatCompletions => {
                request.header("authorization", format!("Bearer {}", self.api_key))
            }
        };
        let mut response = request
            .send_json(&body)
            .with_context(|| format!("POST {}", self.url))?;
        let payload: Value = response
            .body_mut()
            .read_json()
            .context("decode LM response body")?;
        let text = response_text(self.mode, &payload)?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            prompt_bytes = prompt.len(),
            response_bytes = text.len(),
            "lm invoke complete"
        );
        Ok(text.trim().to_string())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Pull the first text block out of a chat response.
fn response_text(mode: ApiMode, payload: &Value) -> Result<String> {
    let text = match mode {
        ApiMode::Anthropic => payload
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            })
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str),
        ApiMode::ChatCompletions => payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str),
    };
    text.map(str::to_string)
        .ok_or_else(|| anyhow!("LM response carried no text content"))
}
