//! Keyword-overlap ranking over the chunk corpus.
//!
//! Score of a chunk = number of distinct query keywords that also occur in
//! the chunk. No term frequency, no length normalization. Ordering is a stable
//! sort by score, so equal scores keep corpus order.

use chunk_store::Chunk;
use serde::Serialize;
use tracing::debug;

use crate::tokenize::keyword_set;

/// Default number of chunks fed to the prompt.
pub const DEFAULT_TOP_K: usize = 5;

/// Score of one chunk for one query. `index` is the chunk's corpus position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RelevanceScore {
    pub index: usize,
    pub score: usize,
}

/// Scores every chunk against `query`, in corpus order.
pub fn score(query: &str, chunks: &[Chunk]) -> Vec<RelevanceScore> {
    let query_keys = keyword_set(query);
    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let chunk_keys = keyword_set(&chunk.content);
            RelevanceScore {
                index,
                score: query_keys.intersection(&chunk_keys).count(),
            }
        })
        .collect()
}

/// Top `top_k` scores, best first; ties in corpus order.
///
/// Returns `min(top_k, chunks.len())` entries, zero-score chunks included.
pub fn rank_scored(query: &str, chunks: &[Chunk], top_k: usize) -> Vec<RelevanceScore> {
    if top_k == 0 || chunks.is_empty() {
        return Vec::new();
    }
    let mut scores = score(query, chunks);
    // `sort_by` is stable.
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(top_k);

    debug!(
        corpus = chunks.len(),
        top_k,
        best = scores.first().map(|s| s.score).unwrap_or(0),
        "ranked chunks"
    );
    scores
}

/// The `top_k` most relevant chunks for `query`.
///
/// ```
/// use chunk_store::Chunk;
/// use contextor::rank::rank;
///
/// let chunks: Vec<Chunk> = ["peru education", "youth learning", "english peru"]
///     .into_iter()
///     .map(Chunk::new)
///     .collect();
/// let top: Vec<&str> = rank("peru", &chunks, 2).iter().map(|c| c.content.as_str()).collect();
/// assert_eq!(top, ["peru education", "english peru"]);
/// ```
pub fn rank<'a>(query: &str, chunks: &'a [Chunk], top_k: usize) -> Vec<&'a Chunk> {
    rank_scored(query, chunks, top_k)
        .into_iter()
        .map(|s| &chunks[s.index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<Chunk> {
        texts.iter().copied().map(Chunk::new).collect()
    }

    fn contents<'a>(ranked: &[&'a Chunk]) -> Vec<&'a str> {
        ranked.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn ties_keep_corpus_order() {
        let chunks = corpus(&["peru education", "youth learning", "english peru"]);
        assert_eq!(
            contents(&rank("peru", &chunks, 2)),
            vec!["peru education", "english peru"]
        );
    }

    #[test]
    fn result_size_is_min_of_k_and_corpus() {
        let chunks = corpus(&["a", "b", "c"]);
        for k in 0..6 {
            assert_eq!(rank("a", &chunks, k).len(), k.min(3));
        }
    }

    #[test]
    fn empty_corpus_gives_nothing() {
        assert!(rank("peru", &[], 5).is_empty());
        assert!(rank_scored("peru", &[], 0).is_empty());
    }

    #[test]
    fn sorted_by_descending_overlap() {
        let chunks = corpus(&[
            "nothing relevant here",
            "youth in Peru",
            "Peru's youth and English education",
            "education",
        ]);
        let scored = rank_scored("Peru youth education", &chunks, 4);
        let order: Vec<usize> = scored.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
        assert_eq!(
            scored.iter().map(|s| s.score).collect::<Vec<_>>(),
            vec![3, 2, 1, 0]
        );
    }

    #[test]
    fn repeated_words_count_once() {
        let chunks = corpus(&["peru peru peru", "peru youth"]);
        let scored = rank_scored("peru youth", &chunks, 2);
        assert_eq!(scored[0], RelevanceScore { index: 1, score: 2 });
        assert_eq!(scored[1], RelevanceScore { index: 0, score: 1 });
    }

    #[test]
    fn blank_query_keeps_corpus_order() {
        let chunks = corpus(&["x", "y", "z"]);
        assert_eq!(contents(&rank("   ", &chunks, 2)), vec!["x", "y"]);
    }

    #[test]
    fn apostrophe_query_matches_plain_words() {
        let chunks = corpus(&["other topic", "peru youth"]);
        assert_eq!(contents(&rank("Peru's Youth", &chunks, 1)), vec!["peru youth"]);
    }
}
