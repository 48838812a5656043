//! Completion-service clients used to answer questions over the corpus.
//!
//! One backend per process, chosen by `LLM_KIND`:
//! - OpenAI chat completions (default) or legacy text completions
//! - Ollama `/api/generate`
//!
//! Start with [`LlmService::from_env`].

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod telemetry;

pub use config::default_config::{config_from_env, config_from_vars};
pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::{LlmProvider, OpenAiApiStyle};
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use llm_service::LlmService;
