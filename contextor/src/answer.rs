//! Answer retrieval: send the prompt to the completion service, get text back.
//!
//! [`try_complete`] reports what went wrong as an [`AnswerError`];
//! [`complete`] maps every error to the configured fallback string, so callers
//! always receive an answer.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use ai_llm_service::{AiLlmError, LlmService};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cfg::ContextorConfig;

/// Text shown instead of an answer when the completion service fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I could not get an answer from the language model right now. Please try again.";

/// Anything that turns a prompt into completion text.
pub trait CompletionClient: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;
}

impl CompletionClient for LlmService {
    /// The whole prompt goes out as a single user message / prompt.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
        Box::pin(LlmService::generate(self, prompt, None))
    }
}

/// Why no answer text was produced.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("completion service failed: {0}")]
    Remote(#[from] AiLlmError),

    #[error("completion service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("completion service returned an empty answer")]
    EmptyAnswer,
}

/// Calls the service once, bounded by `timeout`, and returns the trimmed text.
///
/// # Errors
/// [`AnswerError::Remote`] for transport/status/shape failures,
/// [`AnswerError::Timeout`] when the deadline passes,
/// [`AnswerError::EmptyAnswer`] when the text is blank after trimming.
pub async fn try_complete(
    client: &dyn CompletionClient,
    prompt: &str,
    timeout: Duration,
) -> Result<String, AnswerError> {
    let text = tokio::time::timeout(timeout, client.generate(prompt))
        .await
        .map_err(|_| AnswerError::Timeout(timeout))??;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AnswerError::EmptyAnswer);
    }
    Ok(trimmed.to_string())
}

/// Answer text for `prompt`, or `cfg.fallback_answer` on any failure.
///
/// `question` is only used for logging.
pub async fn complete(
    client: &dyn CompletionClient,
    cfg: &ContextorConfig,
    prompt: &str,
    question: &str,
) -> String {
    complete_flagged(client, cfg, prompt, question).await.0
}

/// Like [`complete`], also reporting whether the fallback was used.
pub(crate) async fn complete_flagged(
    client: &dyn CompletionClient,
    cfg: &ContextorConfig,
    prompt: &str,
    question: &str,
) -> (String, bool) {
    let started = Instant::now();
    match try_complete(client, prompt, cfg.request_timeout).await {
        Ok(answer) => {
            debug!(
                latency_ms = started.elapsed().as_millis(),
                answer_len = answer.len(),
                "answer received"
            );
            (answer, false)
        }
        Err(e) => {
            warn!(
                error = %e,
                question_len = question.len(),
                prompt_len = prompt.len(),
                latency_ms = started.elapsed().as_millis(),
                "answer retrieval failed; using fallback"
            );
            (cfg.fallback_answer.clone(), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};

    struct Fixed(fn() -> Result<String, AiLlmError>);

    impl CompletionClient for Fixed {
        fn generate<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
            let out = (self.0)();
            Box::pin(async move { out })
        }
    }

    struct Stalled;

    impl CompletionClient for Stalled {
        fn generate<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            })
        }
    }

    fn cfg() -> ContextorConfig {
        ContextorConfig {
            request_timeout: Duration::from_millis(50),
            ..ContextorConfig::default()
        }
    }

    #[tokio::test]
    async fn success_is_trimmed() {
        let client = Fixed(|| Ok("\n  Lima is the capital.  \n".into()));
        let out = complete(&client, &cfg(), "p", "q").await;
        assert_eq!(out, "Lima is the capital.");
    }

    #[tokio::test]
    async fn remote_failure_maps_to_fallback() {
        let client = Fixed(|| {
            Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into())
        });
        let out = complete(&client, &cfg(), "p", "q").await;
        assert_eq!(out, FALLBACK_ANSWER);
        assert!(matches!(
            try_complete(&client, "p", Duration::from_secs(1)).await,
            Err(AnswerError::Remote(_))
        ));
    }

    #[tokio::test]
    async fn blank_answer_is_an_error() {
        let client = Fixed(|| Ok(" \n\t".into()));
        assert!(matches!(
            try_complete(&client, "p", Duration::from_secs(1)).await,
            Err(AnswerError::EmptyAnswer)
        ));
        assert_eq!(
            complete_flagged(&client, &cfg(), "p", "q").await,
            (FALLBACK_ANSWER.to_string(), true)
        );
    }

    #[tokio::test]
    async fn stalled_service_times_out() {
        let err = try_complete(&Stalled, "p", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, AnswerError::Timeout(d) if d == Duration::from_millis(20)));

        let custom = ContextorConfig {
            fallback_answer: "no answer".into(),
            ..cfg()
        };
        assert_eq!(
            complete(&Stalled, &custom, "p", "q").await,
            "no answer"
        );
    }
}
