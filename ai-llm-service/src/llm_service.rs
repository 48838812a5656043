//! Shared completion service for the configured backend.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - The HTTP client is built at construction; a bad config fails at startup,
//!   never on the first question.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmService::from_env()?);
//! let text = svc.generate("What is the literacy rate?", None).await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use crate::{
    config::{
        default_config::config_from_env, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

#[derive(Debug)]
enum Backend {
    OpenAi(OpenAiService),
    Ollama(OllamaService),
}

/// Completion service bound to one [`LlmModelConfig`].
#[derive(Debug)]
pub struct LlmService {
    backend: Backend,
    health: HealthService,
}

impl LlmService {
    /// Validates `cfg` and builds the matching backend client.
    ///
    /// # Errors
    /// Config validation errors, or provider construction errors
    /// (missing API key, bad endpoint).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        cfg.validate()?;
        let health = HealthService::new(Some(10))?;
        let backend = match cfg.provider {
            LlmProvider::OpenAI => Backend::OpenAi(OpenAiService::new(cfg)?),
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg)?),
        };
        Ok(Self { backend, health })
    }

    /// Builds the service from `LLM_*` / `OPENAI_*` / `OLLAMA_*` variables.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_from_env()?)
    }

    /// Generates a completion for `prompt`.
    ///
    /// `system` is sent as a system message (OpenAI chat), a system field
    /// (Ollama) or a prefix (legacy completions).
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        match &self.backend {
            Backend::OpenAi(cli) => cli.generate(prompt, system).await,
            Backend::Ollama(cli) => cli.generate(prompt, system).await,
        }
    }

    /// Probes the backend. Never fails.
    pub async fn health(&self) -> HealthStatus {
        self.health.check(self.config()).await
    }

    pub fn config(&self) -> &LlmModelConfig {
        match &self.backend {
            Backend::OpenAi(cli) => cli.config(),
            Backend::Ollama(cli) => cli.config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::llm_provider::OpenAiApiStyle;
    use crate::error_handler::{ProviderError, ProviderErrorKind};
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn openai(endpoint: String, style: OpenAiApiStyle) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-3.5-turbo".into(),
            endpoint,
            api_key: Some("sk-test".into()),
            max_tokens: Some(150),
            temperature: Some(0.7),
            top_p: Some(1.0),
            frequency_penalty: Some(0.0),
            presence_penalty: Some(0.0),
            timeout_secs: Some(5),
            api_style: style,
        }
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let base = serve(Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let last = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("got {last}")}}]
                }))
            }),
        ))
        .await;

        let svc = LlmService::new(openai(base, OpenAiApiStyle::Chat)).unwrap();
        assert_eq!(svc.generate("q", None).await.unwrap(), "got 1");
        assert_eq!(svc.generate("q", Some("sys")).await.unwrap(), "got 2");
    }

    #[tokio::test]
    async fn legacy_completions_round_trip() {
        let base = serve(Router::new().route(
            "/v1/completions",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"choices": [{"text": body["prompt"].clone()}]}))
            }),
        ))
        .await;

        let svc = LlmService::new(openai(base, OpenAiApiStyle::Completions)).unwrap();
        assert_eq!(svc.generate("q", Some("sys")).await.unwrap(), "sys\n\nq");
    }

    #[tokio::test]
    async fn non_success_status_is_provider_error() {
        let base = serve(Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        ))
        .await;

        let svc = LlmService::new(openai(base, OpenAiApiStyle::Chat)).unwrap();
        let err = svc.generate("q", None).await.unwrap_err();
        match err {
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::HttpStatus(http),
                ..
            }) => {
                assert_eq!(http.status.as_u16(), 429);
                assert_eq!(http.snippet, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_provider_error() {
        let base = serve(Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        ))
        .await;

        let svc = LlmService::new(openai(base, OpenAiApiStyle::Chat)).unwrap();
        assert!(matches!(
            svc.generate("q", None).await,
            Err(AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::EmptyChoices,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn ollama_round_trip() {
        let base = serve(Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"response": format!("echo {}", body["prompt"].as_str().unwrap_or("")), "done": true}))
            }),
        ))
        .await;

        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            api_key: None,
            frequency_penalty: None,
            presence_penalty: None,
            ..openai(base, OpenAiApiStyle::Chat)
        };
        let svc = LlmService::new(cfg).unwrap();
        assert_eq!(svc.generate("hola", None).await.unwrap(), "echo hola");
    }

    #[test]
    fn invalid_config_fails_at_construction() {
        let mut cfg = openai("http://127.0.0.1:1".into(), OpenAiApiStyle::Chat);
        cfg.top_p = Some(1.5);
        assert!(LlmService::new(cfg).is_err());
    }
}
