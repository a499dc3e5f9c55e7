//! Core data types for Quickfill.
//!
//! Records arrive as one JSON object per line and are stored verbatim in the
//! data namespace, so `Item` only needs to round-trip through `serde_json`.
//! The `data` payload is never interpreted.

use crate::error::{QuickfillError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Name of a collection of records.
///
/// A kind becomes part of every key the collection uses, so it may not be
/// empty and may not contain `:` or whitespace. A `:` would let one kind's
/// index root alias another kind's prefix keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Kind(String);

impl Kind {
    /// Validate and wrap a kind name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("kind must not be empty")
        } else if name.contains(':') {
            Some("kind must not contain ':'")
        } else if name.chars().any(char::is_whitespace) {
            Some("kind must not contain whitespace")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(QuickfillError::InvalidKind {
                kind: name,
                reason: reason.to_string(),
            }),
            None => Ok(Kind(name)),
        }
    }

    /// Get the kind as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Kind {
    type Err = QuickfillError;

    fn from_str(s: &str) -> Result<Self> {
        Kind::new(s)
    }
}

/// A single autocomplete record.
///
/// `rank` is the only relevance signal: higher ranks sort first. When a
/// record matches several query words its score is the sum of its rank
/// across all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Collection the record was produced for (informational)
    #[serde(default)]
    pub kind: String,

    /// Identifier, unique within a kind
    pub id: String,

    /// Phrase indexed for autocomplete
    pub term: String,

    /// Caller-supplied relevance
    pub rank: i64,

    /// Opaque payload returned verbatim
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Item {
    /// Create a record with an empty payload
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<String>,
        term: impl Into<String>,
        rank: i64,
    ) -> Self {
        Item {
            kind: kind.into(),
            id: id.into(),
            term: term.into(),
            rank,
            data: serde_json::Value::Null,
        }
    }

    /// Attach a payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Decode a record from its wire form, filling in `kind` if absent.
    pub fn from_json(raw: &str, kind: &Kind) -> serde_json::Result<Self> {
        let mut item: Item = serde_json::from_str(raw)?;
        if item.kind.is_empty() {
            item.kind = kind.as_str().to_string();
        }
        Ok(item)
    }

    /// Encode the record as a single JSON line
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Summary of a completed load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Number of records applied
    pub records: u64,

    /// Number of (prefix, id) pairs written to the index
    pub prefixes: u64,

    /// Number of input lines skipped because they were blank
    pub blank_lines: u64,

    /// Wall-clock time spent loading
    pub elapsed: Duration,
}

impl LoadReport {
    /// Records applied per second
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            self.records as f64
        }
    }
}

/// Sizes of a collection's namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Number of distinct prefixes in the index
    pub prefixes: u64,

    /// Number of records in the data namespace
    pub records: u64,
}

impl CollectionStats {
    /// True when nothing is loaded for the kind
    pub fn is_empty(&self) -> bool {
        self.prefixes == 0 && self.records == 0
    }
}

/// A ranked id that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResult {
    /// The id read from the ranked results
    pub id: String,

    /// Why it was skipped
    pub reason: String,
}

/// Results of a query.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    /// Matching records, highest score first
    pub items: Vec<Item>,

    /// Ranked ids that could not be resolved
    pub skipped: Vec<SkippedResult>,

    /// Whether the ranking was served from an existing cache entry
    pub cache_hit: bool,
}

impl QueryOutcome {
    /// Terms of the matching records, in rank order
    pub fn terms(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.term.as_str()).collect()
    }

    /// True when no record matched
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
