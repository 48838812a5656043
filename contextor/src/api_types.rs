//! Public API types re-used by external crates (e.g., the HTTP API layer).

use chunk_store::Chunk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-question knobs.
///
/// Setting `top_k` to `0` means: "use the value from env-config".
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct AskOptions {
    #[serde(default)]
    pub top_k: usize,
}

/// A chunk that was placed in the prompt, with its overlap score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsedChunk {
    /// Position in the chunk store.
    pub index: usize,
    pub score: usize,
    pub content: String,
    /// Metadata carried by the corpus record (source, page, ...).
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl UsedChunk {
    pub(crate) fn new(index: usize, score: usize, chunk: &Chunk) -> Self {
        Self {
            index,
            score,
            content: chunk.content.clone(),
            metadata: chunk
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Final answer together with the exact context passed to the model.
///
/// `fallback` is true when `answer` is the fallback text.
#[derive(Clone, Debug, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub context: Vec<UsedChunk>,
    pub fallback: bool,
}
