//! Corpus location configuration.

use std::path::PathBuf;

/// Default corpus artifact name, relative to the working directory.
pub const DEFAULT_CORPUS_PATH: &str = "docs_chunks_spotlight.json";

/// Where the corpus lives.
#[derive(Clone, Debug)]
pub struct CorpusConfig {
    /// Path to a `.json` array or `.jsonl` file of chunk records.
    pub path: PathBuf,
}

impl CorpusConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads `CORPUS_PATH`, falling back to [`DEFAULT_CORPUS_PATH`].
    pub fn from_env() -> Self {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`CorpusConfig::from_env`] with an explicit lookup.
    pub fn from_vars<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let path = lookup("CORPUS_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CORPUS_PATH.to_string());
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_path_uses_default() {
        let cfg = CorpusConfig::from_vars(|_| Some("  ".into()));
        assert_eq!(cfg.path, PathBuf::from(DEFAULT_CORPUS_PATH));
        let cfg = CorpusConfig::from_vars(|_| Some("data/x.jsonl".into()));
        assert_eq!(cfg.path, PathBuf::from("data/x.jsonl"));
    }
}
