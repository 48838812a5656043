use contextor::{ConversationTurn, UsedChunk};
use serde::{Deserialize, Serialize};

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question. May be empty.
    pub question: String,
    /// Conversation to record the turns in. Without it the question is
    /// answered but nothing is kept.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional override of the number of chunks in the prompt.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    /// True when `answer` is the fallback text.
    pub fallback: bool,
    /// Chunks placed in the prompt, best first.
    pub context: Vec<UsedChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Response payload for /history/{id}.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
}

/// Response payload for DELETE /history/{id}.
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session_id: String,
    pub removed_turns: usize,
}
