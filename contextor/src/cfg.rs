//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use tracing::warn;

use crate::answer::FALLBACK_ANSWER;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::rank::DEFAULT_TOP_K;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Config bag for the pipeline. All fields have defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Chunks per prompt when the caller does not choose (`TOP_K`).
    pub top_k: usize,
    /// Preamble placed before the context (`SYSTEM_PROMPT`).
    pub system_prompt: String,
    /// Text returned when no answer could be retrieved (`FALLBACK_ANSWER`).
    pub fallback_answer: String,
    /// Upper bound for one completion call (`LLM_TIMEOUT_SECS`).
    pub request_timeout: Duration,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_answer: FALLBACK_ANSWER.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ContextorConfig {
    /// Build from the process environment with defaults.
    ///
    /// ```
    /// use contextor::ContextorConfig;
    /// let cfg = ContextorConfig::from_vars(|_| None);
    /// assert_eq!(cfg.top_k, 5);
    /// ```
    pub fn from_env() -> Self {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`ContextorConfig::from_env`] with an explicit lookup.
    ///
    /// Unparsable numbers are logged and replaced by defaults.
    pub fn from_vars<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let d = Self::default();

        Self {
            top_k: parse(get("TOP_K"), "TOP_K", d.top_k),
            system_prompt: get("SYSTEM_PROMPT").unwrap_or(d.system_prompt),
            fallback_answer: get("FALLBACK_ANSWER").unwrap_or(d.fallback_answer),
            request_timeout: Duration::from_secs(parse(
                get("LLM_TIMEOUT_SECS"),
                "LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
        }
    }
}

fn parse<T: std::str::FromStr + Copy + std::fmt::Debug>(raw: Option<String>, key: &str, dflt: T) -> T {
    match raw {
        None => dflt,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %v, default = ?dflt, "invalid number in env; using default");
            dflt
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> ContextorConfig {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ContextorConfig::from_vars(|k| map.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults() {
        let cfg = from(&[]);
        assert_eq!(cfg, ContextorConfig::default());
        assert_eq!(cfg.request_timeout, Duration::from_secs(60));
        assert_eq!(cfg.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn overrides() {
        let cfg = from(&[
            ("TOP_K", "3"),
            ("SYSTEM_PROMPT", "Be brief."),
            ("FALLBACK_ANSWER", "Try later."),
            ("LLM_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.system_prompt, "Be brief.");
        assert_eq!(cfg.fallback_answer, "Try later.");
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = from(&[("TOP_K", "many"), ("LLM_TIMEOUT_SECS", "")]);
        assert_eq!(cfg.top_k, DEFAULT_TOP_K);
        assert_eq!(cfg.request_timeout, Duration::from_secs(60));
    }
}
