//! OpenAI service for answer generation.
//!
//! Minimal, non-streaming client around the OpenAI REST API. Endpoints are
//! derived from `LlmModelConfig::endpoint` and `LlmModelConfig::api_style`:
//! - POST {endpoint}/v1/chat/completions: chat completion (`Chat`)
//! - POST {endpoint}/v1/completions     : legacy text completion (`Completions`)
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::OpenAI`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Response extraction is one explicit contract per style: the first choice's
//! text, or [`ProviderErrorKind::EmptyChoices`] / [`ProviderErrorKind::MissingContent`].

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{
        llm_model_config::LlmModelConfig,
        llm_provider::{LlmProvider, OpenAiApiStyle},
    },
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet},
};

/// Thin client for the OpenAI API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::InvalidProvider`] if `cfg.provider` is not OpenAI
    /// - [`ProviderErrorKind::MissingApiKey`] if `cfg.api_key` is `None`
    /// - [`ProviderErrorKind::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(
                ProviderError::new(Provider::OpenAI, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingApiKey)
        })?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
            )
        })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/');
        let url = match cfg.api_style {
            OpenAiApiStyle::Chat => format!("{}/v1/chat/completions", base),
            OpenAiApiStyle::Completions => format!("{}/v1/completions", base),
        };

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            api_style = ?cfg.api_style,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self { client, cfg, url })
    }

    /// Performs a **non-streaming** completion and returns the first choice's text.
    ///
    /// - `Chat`: messages = optional system message + user message with `prompt`.
    /// - `Completions`: `system` (if any) is prepended to `prompt`.
    ///
    /// The text is returned as produced by the model; trimming is the caller's job.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::HttpStatus`] for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] / [`AiLlmError::Timeout`] for client/network failures
    /// - [`ProviderErrorKind::Decode`] if the JSON cannot be parsed
    /// - [`ProviderErrorKind::EmptyChoices`] / [`ProviderErrorKind::MissingContent`]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let started = Instant::now();

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            has_system = system.is_some(),
            "POST {}", self.url
        );

        let request = match self.cfg.api_style {
            OpenAiApiStyle::Chat => self
                .client
                .post(&self.url)
                .json(&ChatCompletionRequest::from_cfg(&self.cfg, prompt, system)),
            OpenAiApiStyle::Completions => {
                let full;
                let prompt = match system {
                    Some(sys) => {
                        full = format!("{sys}\n\n{prompt}");
                        full.as_str()
                    }
                    None => prompt,
                };
                self.client
                    .post(&self.url)
                    .json(&CompletionRequest::from_cfg(&self.cfg, prompt))
            }
        };

        let resp = request.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI returned non-success status"
            );

            return Err(ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let body = resp.text().await?;
        let content = match self.cfg.api_style {
            OpenAiApiStyle::Chat => extract_chat_text(&body),
            OpenAiApiStyle::Completions => extract_completion_text(&body),
        }
        .inspect_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to extract completion text"
            );
        })?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            answer_len = content.len(),
            "completion finished"
        );

        Ok(content)
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }
}

/// Extracts `choices[0].message.content` from a chat completion body.
///
/// # Errors
/// `Decode` for a foreign shape, `EmptyChoices` for `choices: []`,
/// `MissingContent` when the first message has no content.
pub fn extract_chat_text(body: &str) -> Result<String, ProviderError> {
    let out: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::new(
            Provider::OpenAI,
            ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `choices[0].message.content`"
            )),
        )
    })?;
    let first = out
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))?;
    first
        .message
        .and_then(|m| m.content)
        .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingContent))
}

/// Extracts `choices[0].text` from a legacy completion body.
///
/// # Errors
/// Same contract as [`extract_chat_text`].
pub fn extract_completion_text(body: &str) -> Result<String, ProviderError> {
    let out: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::new(
            Provider::OpenAI,
            ProviderErrorKind::Decode(format!("serde error: {e}; expected `choices[0].text`")),
        )
    })?;
    let first = out
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))?;
    first
        .text
        .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::MissingContent))
}

/* ===========================================================================
HTTP payloads & options
======================================================================== */

/// Minimal request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(flatten)]
    sampling: Sampling,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str, system: Option<&'a str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage {
                role: "system",
                content: sys,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        Self {
            model: &cfg.model,
            messages,
            sampling: Sampling::from(cfg),
        }
    }
}

/// Request body for the legacy `/v1/completions`.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(flatten)]
    sampling: Sampling,
}

impl<'a> CompletionRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str) -> Self {
        Self {
            model: &cfg.model,
            prompt,
            sampling: Sampling::from(cfg),
        }
    }
}

/// Generation knobs shared by both request styles.
#[derive(Debug, Serialize)]
struct Sampling {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

impl From<&LlmModelConfig> for Sampling {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
            frequency_penalty: cfg.frequency_penalty,
            presence_penalty: cfg.presence_penalty,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageOut>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: Option<String>,
}
