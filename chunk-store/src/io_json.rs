//! Strict corpus readers.
//!
//! - [`read_corpus`] → dispatch on file extension.
//! - [`read_json_array`] → one JSON document, top level is an array of records.
//! - [`read_jsonl`] → one record per non-empty line.
//!
//! Both readers are all-or-nothing: the first malformed record aborts the
//! load with its position.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::errors::CorpusLoadError;
use crate::record::{Chunk, json_kind};

/// Reads a corpus, choosing the format from the file extension.
///
/// `.jsonl` and `.ndjson` are read line by line; anything else is treated as
/// a JSON array document.
///
/// # Errors
/// See [`read_json_array`] and [`read_jsonl`].
pub fn read_corpus(path: impl AsRef<Path>) -> Result<Vec<Chunk>, CorpusLoadError> {
    let path = path.as_ref();
    let is_lines = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"));

    if is_lines {
        read_jsonl(path)
    } else {
        read_json_array(path)
    }
}

/// Reads a JSON array of chunk records, preserving array order.
///
/// # Errors
/// - [`CorpusLoadError::NotFound`] / [`CorpusLoadError::Io`] if the file cannot be read.
/// - [`CorpusLoadError::Parse`] if it is not JSON.
/// - [`CorpusLoadError::NotASequence`] if the top level is not an array.
/// - [`CorpusLoadError::InvalidRecord`] for the first malformed element.
pub fn read_json_array(path: impl AsRef<Path>) -> Result<Vec<Chunk>, CorpusLoadError> {
    let path = path.as_ref();
    info!("Reading JSON corpus: {:?}", path);

    let raw = read_to_string(path)?;
    let doc: Value = serde_json::from_str(&raw).map_err(|source| CorpusLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match doc {
        Value::Array(items) => items,
        other => {
            return Err(CorpusLoadError::NotASequence {
                path: path.to_path_buf(),
                found: json_kind(&other),
            });
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let chunk = Chunk::from_value(item)
            .map_err(|reason| CorpusLoadError::InvalidRecord { index, reason })?;
        out.push(chunk);
    }

    debug!("Loaded {} chunks from JSON array", out.len());
    Ok(out)
}

/// Reads JSONL chunk records, preserving line order. Blank lines are skipped.
///
/// # Errors
/// - [`CorpusLoadError::NotFound`] / [`CorpusLoadError::Io`] if the file cannot be read.
/// - [`CorpusLoadError::InvalidLine`] for the first line that is not a valid record.
pub fn read_jsonl(path: impl AsRef<Path>) -> Result<Vec<Chunk>, CorpusLoadError> {
    let path = path.as_ref();
    info!("Reading JSONL corpus: {:?}", path);

    let raw = read_to_string(path)?;

    let mut out = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let value: Value =
            serde_json::from_str(line).map_err(|e| CorpusLoadError::InvalidLine {
                line: i + 1,
                reason: format!("not valid JSON: {e}"),
            })?;

        let chunk = Chunk::from_value(value)
            .map_err(|reason| CorpusLoadError::InvalidLine { line: i + 1, reason })?;
        out.push(chunk);
    }

    debug!("Loaded {} chunks from JSONL", out.len());
    Ok(out)
}

fn read_to_string(path: &Path) -> Result<String, CorpusLoadError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CorpusLoadError::NotFound(path.to_path_buf())
        } else {
            CorpusLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn corpus_file(suffix: &str, body: &str) -> NamedTempFile {
        let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn array_keeps_file_order() {
        let f = corpus_file(
            ".json",
            r#"[
                {"content": "peru education", "page": 1},
                {"content": "youth learning", "page": 2},
                {"content": "english peru", "page": 3}
            ]"#,
        );
        let chunks = read_corpus(f.path()).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(texts, ["peru education", "youth learning", "english peru"]);
        assert_eq!(chunks[2].page(), Some(3));
    }

    #[test]
    fn n_records_in_n_chunks_out() {
        let records: Vec<serde_json::Value> = (0..25)
            .map(|i| serde_json::json!({ "content": format!("chunk {i}"), "id": i }))
            .collect();
        let f = corpus_file(".json", &serde_json::to_string(&records).unwrap());

        let chunks = read_corpus(f.path()).unwrap();
        assert_eq!(chunks.len(), 25);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.content, format!("chunk {i}"));
        }
    }

    #[test]
    fn empty_array_is_a_valid_corpus() {
        let f = corpus_file(".json", "[]");
        assert!(read_corpus(f.path()).unwrap().is_empty());
    }

    #[test]
    fn one_bad_record_fails_the_whole_load() {
        let f = corpus_file(
            ".json",
            r#"[{"content": "ok"}, {"content": null}, {"content": "ok too"}]"#,
        );
        match read_corpus(f.path()) {
            Err(CorpusLoadError::InvalidRecord { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("null"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn top_level_object_is_rejected() {
        let f = corpus_file(".json", r#"{"content": "not a list"}"#);
        assert!(matches!(
            read_corpus(f.path()),
            Err(CorpusLoadError::NotASequence { found: "an object", .. })
        ));
    }

    #[test]
    fn broken_json_is_a_parse_error() {
        let f = corpus_file(".json", r#"[{"content": "unterminated"#);
        assert!(matches!(
            read_corpus(f.path()),
            Err(CorpusLoadError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("docs_chunks.json");
        assert!(matches!(
            read_corpus(&missing),
            Err(CorpusLoadError::NotFound(p)) if p == missing
        ));
    }

    #[test]
    fn jsonl_skips_blank_lines_and_keeps_order() {
        let f = corpus_file(
            ".jsonl",
            "{\"content\": \"first\"}\n\n{\"content\": \"second\", \"source\": \"b.pdf\"}\n",
        );
        let chunks = read_corpus(f.path()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "first");
        assert_eq!(chunks[1].source(), Some("b.pdf"));
    }

    #[test]
    fn jsonl_reports_line_number() {
        let f = corpus_file(".jsonl", "{\"content\": \"a\"}\n{\"text\": \"b\"}\n");
        match read_corpus(f.path()) {
            Err(CorpusLoadError::InvalidLine { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("missing `content`"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
