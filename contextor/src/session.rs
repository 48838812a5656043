//! Per-session conversation history, kept for display only.

use serde::{Deserialize, Serialize};

use crate::{AskOptions, Contextor, NoopProgress, Progress, QaAnswer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Append-only history of one conversation.
///
/// Turns never feed back into ranking or the prompt; every question is
/// answered on its own.
#[derive(Clone, Debug, Default)]
pub struct Session {
    turns: Vec<ConversationTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `question` and records both turns. The assistant turn holds
    /// the fallback text when the service failed.
    pub async fn ask(&mut self, contextor: &Contextor, question: &str, opts: AskOptions) -> QaAnswer {
        self.ask_with_progress(contextor, question, opts, &NoopProgress)
            .await
    }

    pub async fn ask_with_progress(
        &mut self,
        contextor: &Contextor,
        question: &str,
        opts: AskOptions,
        progress: &dyn Progress,
    ) -> QaAnswer {
        self.push(Role::User, question);
        let qa = contextor.answer_with_progress(question, opts, progress).await;
        self.push(Role::Assistant, &qa.answer);
        qa
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn push(&mut self, role: Role, content: &str) {
        self.turns.push(ConversationTurn {
            role,
            content: content.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let t = ConversationTurn {
            role: Role::Assistant,
            content: "hi".into(),
        };
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            r#"{"role":"assistant","content":"hi"}"#
        );
    }
}
