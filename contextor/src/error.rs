//! Typed error for building a [`crate::Contextor`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Corpus could not be loaded.
    #[error("corpus error: {0}")]
    Corpus(#[from] chunk_store::CorpusLoadError),

    /// Completion service config or client construction failed.
    #[error("completion service error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),
}
