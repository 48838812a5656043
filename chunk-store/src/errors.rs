//! Unified error type for corpus loading.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to materialize the corpus at startup.
///
/// Any of these is fatal: the store never holds a partially valid corpus.
#[derive(Debug, Error)]
pub enum CorpusLoadError {
    /// The corpus file does not exist.
    #[error("corpus file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The corpus file exists but could not be read.
    #[error("failed to read corpus {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus is not valid JSON.
    #[error("corpus {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The corpus parsed, but its top level is not an array of records.
    #[error("corpus {} must be a JSON array of chunk records, found {found}", .path.display())]
    NotASequence { path: PathBuf, found: &'static str },

    /// A record inside a JSON array is malformed (0-based index).
    #[error("invalid chunk record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// A line of a JSONL corpus is malformed (1-based line number).
    #[error("invalid chunk record on line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}
