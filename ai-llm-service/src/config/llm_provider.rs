use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for answer generation.
///
/// Selected at startup from `LLM_KIND` (`openai` / `chatgpt` / `ollama`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// OpenAI REST API (or any compatible server).
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Which OpenAI endpoint carries the prompt.
///
/// - `Chat`        → `/v1/chat/completions`, prompt sent as one user message.
/// - `Completions` → legacy `/v1/completions`, prompt sent verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpenAiApiStyle {
    #[default]
    Chat,
    Completions,
}

impl FromStr for OpenAiApiStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(OpenAiApiStyle::Chat),
            "completions" | "completion" | "legacy" => Ok(OpenAiApiStyle::Completions),
            other => Err(ConfigError::UnsupportedProvider(format!(
                "OpenAI API style `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("chatgpt".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!(" ollama ".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert!("anthropic".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn parses_styles() {
        assert_eq!("chat".parse::<OpenAiApiStyle>().unwrap(), OpenAiApiStyle::Chat);
        assert_eq!(
            "completions".parse::<OpenAiApiStyle>().unwrap(),
            OpenAiApiStyle::Completions
        );
        assert!("stream".parse::<OpenAiApiStyle>().is_err());
    }
}
