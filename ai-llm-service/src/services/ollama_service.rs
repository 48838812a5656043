//! Ollama service for local answer generation.
//!
//! - `POST {endpoint}/api/generate` with `stream=false`
//!
//! Uses [`LlmModelConfig`] and requires `provider == LlmProvider::Ollama`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{
    AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
};

/// Thin client for Ollama.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::InvalidProvider`] if `cfg.provider` is not `Ollama`
    /// - [`ProviderErrorKind::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let url_generate = format!("{}/api/generate", endpoint.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OllamaService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Performs a **non-streaming** generation request via `/api/generate`.
    ///
    /// Mapped options:
    /// - `model`        ← `self.cfg.model`
    /// - `prompt`       ← argument
    /// - `system`       ← argument (omitted when `None`)
    /// - `num_predict`  ← `self.cfg.max_tokens`
    /// - `temperature`  ← `self.cfg.temperature`
    /// - `top_p`        ← `self.cfg.top_p`
    ///
    /// # Errors
    /// - [`ProviderErrorKind::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] / [`AiLlmError::Timeout`] for client errors
    /// - [`ProviderErrorKind::Decode`] if the response cannot be parsed
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = GenerateRequest::from_cfg(&self.cfg, prompt, system);

        debug!(prompt_len = prompt.len(), "POST {}", self.url_generate);
        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Ollama returned non-success status"
            );

            return Err(ProviderError::new(
                Provider::Ollama,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let body = resp.text().await?;
        let text = extract_generate_text(&body)?;

        info!(
            latency_ms = started.elapsed().as_millis(),
            answer_len = text.len(),
            "generation finished"
        );
        Ok(text)
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }
}

/// Extracts `response` from a non-streaming `/api/generate` body.
pub fn extract_generate_text(body: &str) -> Result<String, ProviderError> {
    let out: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::new(
            Provider::Ollama,
            ProviderErrorKind::Decode(format!("serde error: {e}; ensure `stream=false` is used")),
        )
    })?;
    out.response
        .ok_or_else(|| ProviderError::new(Provider::Ollama, ProviderErrorKind::MissingContent))
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/api/generate` (non-streaming).
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

impl<'a> GenerateRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str, system: Option<&'a str>) -> Self {
        Self {
            model: &cfg.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature: cfg.temperature,
                top_p: cfg.top_p,
                num_predict: cfg.max_tokens,
            },
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::llm_provider::OpenAiApiStyle;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: "http://localhost:11434/".into(),
            api_key: None,
            max_tokens: Some(150),
            temperature: Some(0.7),
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            timeout_secs: Some(5),
            api_style: OpenAiApiStyle::Chat,
        }
    }

    #[test]
    fn request_maps_options() {
        let c = cfg();
        let v = serde_json::to_value(GenerateRequest::from_cfg(&c, "q", None)).unwrap();
        assert_eq!(v["stream"], false);
        assert_eq!(v["options"]["num_predict"], 150);
        assert!(v["options"].get("top_p").is_none());
        assert!(v.get("system").is_none());
    }

    #[test]
    fn extract_response_field() {
        assert_eq!(
            extract_generate_text(r#"{"model":"llama3","response":"Lima","done":true}"#).unwrap(),
            "Lima"
        );
        let err = extract_generate_text(r#"{"done":true}"#).unwrap_err();
        assert!(matches!(err.kind, ProviderErrorKind::MissingContent));
    }

    #[test]
    fn new_rejects_openai_config() {
        let mut c = cfg();
        c.provider = LlmProvider::OpenAI;
        assert!(OllamaService::new(c).is_err());
        assert!(OllamaService::new(cfg()).is_ok());
    }
}
