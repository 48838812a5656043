//! Default LLM config loaded from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = `openai` (default) | `chatgpt` | `ollama`
//! - `LLM_MAX_TOKENS`   = max generated tokens (default `150`)
//! - `LLM_TEMPERATURE`  = sampling temperature (default `0.7`)
//! - `LLM_TOP_P`        = nucleus sampling (default `1.0`)
//! - `LLM_TIMEOUT_SECS` = HTTP timeout (default `60`)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`   = bearer token (mandatory)
//! - `OPENAI_MODEL`     = model (default `gpt-3.5-turbo`)
//! - `OPENAI_URL`       = base URL (default `https://api.openai.com`)
//! - `OPENAI_API_STYLE` = `chat` (default) | `completions`
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model (mandatory)

use crate::{
    config::{
        llm_model_config::LlmModelConfig,
        llm_provider::{LlmProvider, OpenAiApiStyle},
    },
    error_handler::{AiLlmError, ConfigError, Result},
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 150;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 1.0;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Builds and validates the answer-generation config from the process env.
///
/// # Errors
/// Any [`ConfigError`] for missing/invalid variables, or validation failures.
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from_vars(|k| std::env::var(k).ok())
}

/// Same as [`config_from_env`], with an explicit variable lookup.
pub fn config_from_vars<F>(lookup: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let vars = Vars(lookup);
    let provider = match vars.opt("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let cfg = match provider {
        LlmProvider::OpenAI => config_openai(&vars)?,
        LlmProvider::Ollama => config_ollama(&vars)?,
    };
    cfg.validate()?;
    Ok(cfg)
}

fn config_openai<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<LlmModelConfig> {
    let api_key = vars.required("OPENAI_API_KEY")?;
    let api_style = match vars.opt("OPENAI_API_STYLE") {
        Some(s) => s.parse::<OpenAiApiStyle>()?,
        None => OpenAiApiStyle::Chat,
    };

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: vars
            .opt("OPENAI_MODEL")
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        endpoint: vars
            .opt("OPENAI_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
        api_key: Some(api_key),
        max_tokens: Some(vars.parse("LLM_MAX_TOKENS", "expected u32")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(vars.parse("LLM_TEMPERATURE", "expected f32")?.unwrap_or(DEFAULT_TEMPERATURE)),
        top_p: Some(vars.parse("LLM_TOP_P", "expected f32")?.unwrap_or(DEFAULT_TOP_P)),
        frequency_penalty: Some(0.0),
        presence_penalty: Some(0.0),
        timeout_secs: Some(vars.parse("LLM_TIMEOUT_SECS", "expected u64")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        api_style,
    })
}

fn config_ollama<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<LlmModelConfig> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: vars.required("OLLAMA_MODEL")?,
        endpoint: ollama_endpoint(vars)?,
        api_key: None,
        max_tokens: Some(vars.parse("LLM_MAX_TOKENS", "expected u32")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(vars.parse("LLM_TEMPERATURE", "expected f32")?.unwrap_or(DEFAULT_TEMPERATURE)),
        top_p: Some(vars.parse("LLM_TOP_P", "expected f32")?.unwrap_or(DEFAULT_TOP_P)),
        frequency_penalty: None,
        presence_penalty: None,
        timeout_secs: Some(vars.parse("LLM_TIMEOUT_SECS", "expected u64")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        api_style: OpenAiApiStyle::default(),
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<String> {
    if let Some(url) = vars.opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = vars.opt("OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Variable lookup that treats empty values as unset.
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn opt(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String> {
        self.opt(name)
            .ok_or_else(|| ConfigError::MissingVar(name).into())
    }

    fn parse<T: std::str::FromStr>(
        &self,
        name: &'static str,
        reason: &'static str,
    ) -> Result<Option<T>> {
        match self.opt(name) {
            Some(v) => v
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber { var: name, reason }.into()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn openai_defaults_follow_original_app() {
        let cfg = config_from_vars(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(cfg.provider, LlmProvider::OpenAI);
        assert_eq!(cfg.model, "gpt-3.5-turbo");
        assert_eq!(cfg.endpoint, "https://api.openai.com");
        assert_eq!(cfg.max_tokens, Some(150));
        assert_eq!(cfg.temperature, Some(0.7));
        assert_eq!(cfg.top_p, Some(1.0));
        assert_eq!(cfg.api_style, OpenAiApiStyle::Chat);
    }

    #[test]
    fn openai_requires_key() {
        let err = config_from_vars(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn overrides_and_legacy_style() {
        let cfg = config_from_vars(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_STYLE", "completions"),
            ("OPENAI_MODEL", "gpt-3.5-turbo-instruct"),
            ("LLM_MAX_TOKENS", "300"),
            ("LLM_TEMPERATURE", "0.2"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_style, OpenAiApiStyle::Completions);
        assert_eq!(cfg.model, "gpt-3.5-turbo-instruct");
        assert_eq!(cfg.max_tokens, Some(300));
        assert_eq!(cfg.temperature, Some(0.2));
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = config_from_vars(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_MAX_TOKENS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidNumber { var: "LLM_MAX_TOKENS", .. })
        ));
    }

    #[test]
    fn ollama_from_port() {
        let cfg = config_from_vars(lookup(&[
            ("LLM_KIND", "ollama"),
            ("OLLAMA_PORT", "11434"),
            ("OLLAMA_MODEL", "llama3"),
        ]))
        .unwrap();
        assert_eq!(cfg.provider, LlmProvider::Ollama);
        assert_eq!(cfg.endpoint, "http://localhost:11434");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn ollama_needs_endpoint() {
        let err = config_from_vars(lookup(&[("LLM_KIND", "ollama"), ("OLLAMA_MODEL", "m")]))
            .unwrap_err();
        assert!(matches!(err, AiLlmError::Config(ConfigError::MissingVar(_))));
    }

    #[test]
    fn temperature_out_of_range_fails_validation() {
        let err = config_from_vars(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_TEMPERATURE", "5"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::OutOfRange { field: "temperature", .. })
        ));
    }
}
