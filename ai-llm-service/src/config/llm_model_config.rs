use crate::config::llm_provider::{LlmProvider, OpenAiApiStyle};
use crate::error_handler::{
    ConfigError, Result, validate_http_endpoint, validate_range_f32,
};

/// Configuration for an LLM model invocation.
///
/// Generation parameters (`max_tokens`, `temperature`, ...) are fixed per
/// process; callers never choose them per request.
///
/// # Fields
///
/// - `provider`: which backend to call.
/// - `model`: model identifier (e.g. `"gpt-3.5-turbo"`, `"llama3"`).
/// - `endpoint`: base URL of the API (no path).
/// - `api_key`: bearer token for providers that require it. Never logged.
/// - `max_tokens`: maximum number of tokens to generate.
/// - `temperature`: sampling temperature.
/// - `top_p`: nucleus sampling cutoff.
/// - `frequency_penalty` / `presence_penalty`: OpenAI-only penalties.
/// - `timeout_secs`: HTTP request timeout.
/// - `api_style`: OpenAI endpoint family (ignored by Ollama).
#[derive(Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub api_style: OpenAiApiStyle,
}

impl LlmModelConfig {
    /// Checks ranges and formats before any client is built.
    ///
    /// # Errors
    /// [`ConfigError::EmptyModel`], [`ConfigError::InvalidFormat`] or
    /// [`ConfigError::OutOfRange`].
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", &self.endpoint)?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0, "expected 0.0..=2.0")?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0, "expected 0.0..=1.0")?;
        }
        for (field, v) in [
            ("frequency_penalty", self.frequency_penalty),
            ("presence_penalty", self.presence_penalty),
        ] {
            if let Some(v) = v {
                validate_range_f32(field, v, -2.0, 2.0, "expected -2.0..=2.0")?;
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ConfigError::OutOfRange {
                field: "max_tokens",
                detail: "expected > 0",
            }
            .into());
        }
        Ok(())
    }
}

// Hand-written so the API key never reaches logs.
impl std::fmt::Debug for LlmModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("presence_penalty", &self.presence_penalty)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_style", &self.api_style)
            .finish()
    }
}
