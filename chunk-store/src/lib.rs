//! Read-only chunk store.
//!
//! The corpus is a flat, ordered sequence of pre-built text chunks. It is
//! loaded once at startup and then only read; share it as `Arc<ChunkStore>`.
//!
//! ```no_run
//! use chunk_store::ChunkStore;
//!
//! let store = ChunkStore::load("docs_chunks_spotlight.json").unwrap();
//! println!("{} chunks", store.len());
//! ```

mod config;
mod errors;
mod io_json;
mod record;

pub use config::{CorpusConfig, DEFAULT_CORPUS_PATH};
pub use errors::CorpusLoadError;
pub use io_json::{read_corpus, read_json_array, read_jsonl};
pub use record::Chunk;

use std::path::{Path, PathBuf};

use tracing::info;

/// In-memory corpus. No method mutates it after construction.
#[derive(Clone, Debug, Default)]
pub struct ChunkStore {
    source: Option<PathBuf>,
    chunks: Vec<Chunk>,
}

impl ChunkStore {
    /// Loads the whole corpus from disk.
    ///
    /// # Errors
    /// Returns [`CorpusLoadError`] if the file is missing, unreadable, or any
    /// record is malformed. Nothing is kept from a failed load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusLoadError> {
        let path = path.as_ref();
        let chunks = read_corpus(path)?;
        info!(path = %path.display(), chunks = chunks.len(), "corpus loaded");
        Ok(Self {
            source: Some(path.to_path_buf()),
            chunks,
        })
    }

    /// Loads from the location described by `cfg`.
    pub fn load_from(cfg: &CorpusConfig) -> Result<Self, CorpusLoadError> {
        Self::load(&cfg.path)
    }

    /// Builds a store from chunks already in memory.
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self {
            source: None,
            chunks,
        }
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// File the store was loaded from (`None` for in-memory stores).
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl<'a> IntoIterator for &'a ChunkStore {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_records_source_and_count() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"[{{"content": "a"}}, {{"content": "b"}}]"#).unwrap();

        let store = ChunkStore::load(f.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.source(), Some(f.path()));
        assert_eq!(store.get(1).map(|c| c.content.as_str()), Some("b"));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn in_memory_store() {
        let store = ChunkStore::from_chunks(vec![Chunk::new("x")]);
        assert!(store.source().is_none());
        assert_eq!((&store).into_iter().count(), 1);
        assert!(ChunkStore::default().is_empty());
    }
}
