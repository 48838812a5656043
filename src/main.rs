//! `edu-qa`: ask questions about a corpus of document chunks.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `edu-qa serve` | HTTP API (default) |
//! | `edu-qa chat` | Interactive console session |
//! | `edu-qa ask "<question>"` | One question, answer on stdout |
//!
//! Settings come from the environment (optionally a `.env` file):
//! `CORPUS_PATH`, `LLM_KIND`, `OPENAI_API_KEY`, `TOP_K`, `API_ADDRESS`,
//! `SESSION_TTL_SECS`, `MAX_SESSIONS`, ...

use std::{path::PathBuf, sync::Arc};

use ai_llm_service::{LlmService, telemetry};
use anyhow::{Context, Result};
use api::{AppState, SessionPolicy};
use chunk_store::{ChunkStore, CorpusConfig};
use clap::{Parser, Subcommand};
use contextor::{AskOptions, Contextor, ContextorConfig, IndicatifProgress, Role, Session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, info};

#[derive(Parser)]
#[command(
    name = "edu-qa",
    about = "Question answering over a fixed corpus of document chunks",
    version
)]
struct Cli {
    /// Corpus file (JSON array or JSON Lines). Overrides `CORPUS_PATH`.
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Chunks per prompt. Overrides `TOP_K`.
    #[arg(long, global = true)]
    top_k: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Serve {
        /// Bind address. Defaults to `API_ADDRESS` or 127.0.0.1:8080.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Interactive question/answer loop.
    ///
    /// `/history` prints the conversation, `/clear` empties it, `/quit` exits.
    Chat,

    /// Answer one question and exit.
    Ask {
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; settings may come from the real environment.
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("failed to read .env"),
    }

    telemetry::init("info", Level::INFO).context("failed to install tracing subscriber")?;

    let cli = Cli::parse();

    let corpus = match cli.corpus {
        Some(path) => CorpusConfig::new(path),
        None => CorpusConfig::from_env(),
    };
    let store = ChunkStore::load_from(&corpus)
        .with_context(|| format!("failed to load corpus from {}", corpus.path.display()))?;
    let store = Arc::new(store);

    let llm = Arc::new(LlmService::from_env().context("invalid completion service settings")?);
    let mut cfg = ContextorConfig::from_env();
    if let Some(k) = cli.top_k {
        cfg.top_k = k;
    }
    info!(
        chunks = store.len(),
        provider = ?llm.config().provider,
        model = %llm.config().model,
        top_k = cfg.top_k,
        "pipeline ready"
    );
    let contextor = Contextor::new(store, llm.clone(), cfg);

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(api::address_from_env);
            let state = Arc::new(
                AppState::new(contextor, Some(llm)).with_session_policy(SessionPolicy::from_env()),
            );
            api::start(state, &addr).await?;
        }
        Commands::Chat => chat(&contextor).await?,
        Commands::Ask { question } => {
            let progress = IndicatifProgress::spinner();
            let qa = contextor
                .answer_with_progress(&question, AskOptions::default(), &progress)
                .await;
            println!("{}", qa.answer);
        }
    }

    Ok(())
}

async fn chat(contextor: &Contextor) -> Result<()> {
    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Ask about the documents. /history, /clear, /quit.");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                continue;
            }
            "/history" => {
                for turn in session.history() {
                    let label = match turn.role {
                        Role::User => "Question",
                        Role::Assistant => "Answer",
                    };
                    println!("{label}: {}", turn.content);
                }
                continue;
            }
            _ => {}
        }

        let progress = IndicatifProgress::spinner();
        let qa = session
            .ask_with_progress(contextor, question, AskOptions::default(), &progress)
            .await;
        println!("Answer: {}", qa.answer);
    }
    Ok(())
}
