//! Health checks for the configured completion backend.
//!
//! - Ollama: `GET {endpoint}/api/tags`, model looked up by `name`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth, model looked up by `id`
//!
//! [`HealthService::check`] never fails; errors become `ok = false`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for the backend.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// "OpenAI" or "Ollama".
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    /// Probe latency in milliseconds.
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker with its own short-timeout HTTP client.
#[derive(Debug)]
pub struct HealthService {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthService {
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// Probes the backend described by `cfg`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.probe_openai(cfg).await,
        };
        let latency = start.elapsed().as_millis();

        match result {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                warn!(
                    provider = ?cfg.provider,
                    endpoint = %cfg.endpoint,
                    latency_ms = latency,
                    error = %err,
                    "health probe failed"
                );
                HealthStatus::new(cfg, false, latency, err.to_string())
            }
        }
    }

    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        #[derive(Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        let (body, latency) = self.get(&url, None).await?;

        Ok(match serde_json::from_str::<Tags>(&body) {
            Ok(Tags {
                models: Some(models),
            }) if !models.iter().any(|m| m.name == cfg.model) => HealthStatus::new(
                cfg,
                false,
                latency,
                "Ollama is up, but model not found in /api/tags",
            ),
            Ok(_) => HealthStatus::new(cfg, true, latency, "Ollama is healthy"),
            Err(e) => HealthStatus::new(
                cfg,
                true,
                latency,
                format!("Ollama is reachable; failed to decode /api/tags: {e}"),
            ),
        })
    }

    async fn probe_openai(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        #[derive(Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;

        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));
        let (body, latency) = self.get(&url, Some(api_key)).await?;

        Ok(match serde_json::from_str::<Models>(&body) {
            Ok(models) if models.data.iter().any(|m| m.id == cfg.model) => {
                HealthStatus::new(cfg, true, latency, "OpenAI is healthy; model is available")
            }
            Ok(_) => HealthStatus::new(
                cfg,
                false,
                latency,
                "OpenAI is up, but model not found in /v1/models",
            ),
            Err(e) => HealthStatus::new(
                cfg,
                true,
                latency,
                format!("OpenAI is reachable; failed to decode /v1/models: {e}"),
            ),
        })
    }

    /// GETs `url` and returns the body of a 2xx response with its latency.
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<(String, u128), AiLlmError> {
        debug!(timeout_secs = self.timeout.as_secs(), "GET {}", url);
        let start = Instant::now();

        let mut req = self.client.get(url);
        if let Some(key) = bearer {
            let mut auth = header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
            auth.set_sensitive(true);
            req = req.header(header::AUTHORIZATION, auth);
        }

        let resp = req.send().await?;
        let latency = start.elapsed().as_millis();
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })
            .into());
        }
        Ok((text, latency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::llm_provider::OpenAiApiStyle;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn cfg(provider: LlmProvider, endpoint: String, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider,
            model: model.into(),
            endpoint,
            api_key: Some("sk-test".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            timeout_secs: Some(5),
            api_style: OpenAiApiStyle::Chat,
        }
    }

    #[tokio::test]
    async fn openai_model_listed() {
        let base = serve(Router::new().route(
            "/v1/models",
            get(|| async { Json(json!({"data": [{"id": "gpt-3.5-turbo"}]})) }),
        ))
        .await;
        let svc = HealthService::new(Some(5)).unwrap();

        let ok = svc.check(&cfg(LlmProvider::OpenAI, base.clone(), "gpt-3.5-turbo")).await;
        assert!(ok.ok, "{}", ok.message);

        let missing = svc.check(&cfg(LlmProvider::OpenAI, base, "gpt-4")).await;
        assert!(!missing.ok);
    }

    #[tokio::test]
    async fn ollama_error_status_is_unhealthy() {
        let base = serve(Router::new().route(
            "/api/tags",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "loading") }),
        ))
        .await;
        let svc = HealthService::new(Some(5)).unwrap();
        let status = svc.check(&cfg(LlmProvider::Ollama, base, "llama3")).await;
        assert!(!status.ok);
        assert!(status.message.contains("503"), "{}", status.message);
    }
}
