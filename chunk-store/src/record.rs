//! Chunk record as stored in the corpus.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single pre-segmented fragment of source document text.
///
/// Only `content` is interpreted; every other field of the corpus record is
/// kept verbatim in `metadata` (source document, page, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Value>,
}

impl Chunk {
    /// Chunk with text only and no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Raw metadata value by key.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Originating document, if the corpus recorded one (`source` or `document`).
    pub fn source(&self) -> Option<&str> {
        ["source", "document"]
            .iter()
            .find_map(|k| self.metadata.get(*k).and_then(Value::as_str))
    }

    /// Page number within the originating document, if recorded.
    pub fn page(&self) -> Option<u64> {
        self.metadata.get("page").and_then(Value::as_u64)
    }

    /// Strict conversion of one corpus record.
    ///
    /// The record must be an object with a non-null string `content`.
    /// Returns a human-readable reason on failure; the caller attaches the
    /// record position.
    pub(crate) fn from_value(value: Value) -> Result<Self, String> {
        let mut map: Map<String, Value> = match value {
            Value::Object(m) => m,
            other => {
                return Err(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                ));
            }
        };

        let content = match map.remove("content") {
            Some(Value::String(s)) => s,
            Some(Value::Null) => return Err("`content` is null".to_string()),
            Some(other) => {
                return Err(format!(
                    "`content` must be a string, found {}",
                    json_kind(&other)
                ));
            }
            None => return Err("missing `content` field".to_string()),
        };

        Ok(Self {
            content,
            metadata: map.into_iter().collect(),
        })
    }
}

/// Short name of a JSON value's type for diagnostics.
pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
