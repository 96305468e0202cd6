//! Core data types shared across the cache, search, and HTTP layers.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

/// The fixed column holding a row's category. Its absence is a schema error
/// when a category filter is requested, distinct from "no rows matched".
pub const CATEGORY_COLUMN: &str = "category";

/// A single table cell with its discovered type.
///
/// Missing cells are normalized to [`Value::Empty`] at load time and render
/// as an empty string everywhere, so downstream code never sees an unset cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Empty,
}

impl Value {
    /// Parse a raw CSV cell. Empty and whitespace-only cells become `Empty`;
    /// cells that parse as finite numbers become `Number`, but only when the
    /// canonical numeric form preserves the uploaded text — identifiers like
    /// `007` or `1e5` stay text so their search and category forms never
    /// drift from the file.
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                let number = Value::Number(n);
                if number.as_text() == trimmed {
                    return number;
                }
            }
        }
        Value::Text(raw.to_string())
    }

    /// The string form used for `search_text` derivation and exact-match
    /// category comparison. Integral numbers render without a trailing `.0`.
    pub fn as_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Value::Number(n) => n.to_string(),
            Value::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// JSON representation for API payloads.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Empty => serde_json::Value::String(String::new()),
        }
    }
}

/// Identity of the uploaded file a cache entry was built from.
///
/// Compared only for equality during the staleness check; the path is opened
/// exclusively by the rebuild itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    pub path: PathBuf,
    /// Creation-time marker (modification time where creation time is not
    /// available on the filesystem).
    pub stamp: SystemTime,
}

/// One ranked search hit: the row's original fields plus its cosine score.
///
/// Produced fresh per query, never cached. Serializes flat, with the fields
/// inlined next to `similarity`, matching the row-record JSON shape of the
/// API.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub similarity: f64,
}
