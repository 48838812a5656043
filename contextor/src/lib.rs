//! Keyword-RAG gateway over a fixed chunk corpus.
//!
//! Public API: [`Contextor::answer`]. It ranks the corpus by keyword overlap
//! with the question, assembles the top chunks into a prompt, asks the
//! completion service, and returns the answer with the context that was used.
//! Failures of the completion service become the fallback answer; `answer`
//! itself never fails.

pub mod answer;
pub mod prompt;
pub mod rank;
pub mod tokenize;

mod api_types;
mod cfg;
mod error;
mod progress;
mod session;

use std::sync::Arc;

use ai_llm_service::{LlmService, config_from_vars};
use chunk_store::{ChunkStore, CorpusConfig};
use tracing::{debug, info};

pub use answer::{AnswerError, CompletionClient, FALLBACK_ANSWER};
pub use api_types::{AskOptions, QaAnswer, UsedChunk};
pub use cfg::ContextorConfig;
pub use error::ContextorError;
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use rank::{RelevanceScore, rank, rank_scored};
pub use session::{ConversationTurn, Role, Session};

/// The question-answering pipeline: corpus, completion client and knobs.
///
/// Cheap to share behind an `Arc`; holds no mutable state.
#[derive(Clone)]
pub struct Contextor {
    store: Arc<ChunkStore>,
    client: Arc<dyn CompletionClient>,
    cfg: ContextorConfig,
}

impl Contextor {
    pub fn new(
        store: Arc<ChunkStore>,
        client: Arc<dyn CompletionClient>,
        cfg: ContextorConfig,
    ) -> Self {
        Self { store, client, cfg }
    }

    /// Loads the corpus and builds the completion client and knobs from
    /// environment variables.
    ///
    /// # Errors
    /// [`ContextorError::Corpus`] if the corpus cannot be loaded,
    /// [`ContextorError::Llm`] if the completion service config is invalid.
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`Contextor::from_env`] with an explicit lookup.
    pub fn from_vars<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ContextorError> {
        let store = ChunkStore::load_from(&CorpusConfig::from_vars(&lookup))?;
        let llm = LlmService::new(config_from_vars(&lookup)?)?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(llm),
            ContextorConfig::from_vars(&lookup),
        ))
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn config(&self) -> &ContextorConfig {
        &self.cfg
    }

    /// Ranks the corpus and builds the prompt for `question`.
    ///
    /// Returns the prompt and the chunks it contains, best first.
    pub fn build_prompt(&self, question: &str, opts: AskOptions) -> (String, Vec<UsedChunk>) {
        let top_k = if opts.top_k == 0 {
            self.cfg.top_k
        } else {
            opts.top_k
        };
        let chunks = self.store.chunks();
        let scored = rank_scored(question, chunks, top_k);
        let ranked: Vec<_> = scored.iter().map(|s| &chunks[s.index]).collect();
        let prompt = prompt::assemble(&self.cfg.system_prompt, &ranked, question);

        let used = scored
            .iter()
            .zip(&ranked)
            .map(|(s, c)| UsedChunk::new(s.index, s.score, c))
            .collect();
        (prompt, used)
    }

    /// Answers `question`. Never fails: service errors yield the fallback text
    /// with `fallback = true`.
    ///
    /// # Example
    /// ```no_run
    /// # use contextor::{AskOptions, Contextor};
    /// # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let ctx = Contextor::from_env()?;
    /// let qa = ctx.answer("How many students finished school?", AskOptions::default()).await;
    /// println!("{}", qa.answer);
    /// # Ok(()) }
    /// ```
    pub async fn answer(&self, question: &str, opts: AskOptions) -> QaAnswer {
        self.answer_with_progress(question, opts, &NoopProgress).await
    }

    /// Same as [`Contextor::answer`], reporting steps to `progress`.
    pub async fn answer_with_progress(
        &self,
        question: &str,
        opts: AskOptions,
        progress: &dyn Progress,
    ) -> QaAnswer {
        if question.trim().is_empty() {
            debug!("empty question; ranking falls back to corpus order");
        }

        progress.message("Ranking documents...");
        let (prompt, context) = self.build_prompt(question, opts);

        progress.message("Generating answer...");
        let (answer, fallback) =
            answer::complete_flagged(self.client.as_ref(), &self.cfg, &prompt, question).await;
        progress.finish();

        info!(
            context = context.len(),
            prompt_len = prompt.len(),
            fallback,
            "question answered"
        );

        QaAnswer {
            answer,
            context,
            fallback,
        }
    }
}
