//! Store query model
//!
//! Filters, field updates and aggregation stages understood by every
//! [`DocumentStore`](super::DocumentStore) backend.

use serde_json::Value;

/// JSON object stored in a collection
pub type Document = Value;

/// Name of the identifier field every stored document carries
pub const ID_FIELD: &str = "_id";

/// Selects the documents an operation applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document of the collection
    All,
    /// Top-level `field` equals `value`
    Eq(String, Value),
    /// Top-level string `field` contains the text, ignoring case
    ContainsCaseInsensitive(String, String),
}

impl Filter {
    /// Match on the document identifier
    pub fn by_id(id: &str) -> Self {
        Filter::Eq(ID_FIELD.to_string(), Value::String(id.to_string()))
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn contains(field: &str, text: &str) -> Self {
        Filter::ContainsCaseInsensitive(field.to_string(), text.to_string())
    }

    /// Evaluate the filter against an in-memory document.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => document.get(field) == Some(value),
            Filter::ContainsCaseInsensitive(field, text) => document
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&text.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// Sets one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub field: String,
    pub value: Value,
}

impl FieldUpdate {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// One stage of an aggregation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Group documents by `key` and emit `{ _id: <key>, <output>: avg(<average>) }`.
    ///
    /// Groups are emitted in ascending order of their key. Non-numeric
    /// values of `average` are ignored.
    Group {
        key: String,
        average: String,
        output: String,
    },
    /// Stable sort on a top-level field. Missing fields sort lowest.
    Sort { field: String, descending: bool },
    /// Keep the first `n` documents
    Limit(usize),
    /// Attach every document of `from` whose `foreign_field` equals this
    /// document's `local_field`, as an array under `as_field`.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
}

impl Stage {
    pub fn group_average(key: &str, average: &str, output: &str) -> Self {
        Stage::Group {
            key: key.to_string(),
            average: average.to_string(),
            output: output.to_string(),
        }
    }

    pub fn sort_descending(field: &str) -> Self {
        Stage::Sort {
            field: field.to_string(),
            descending: true,
        }
    }

    pub fn lookup(from: &str, local_field: &str, foreign_field: &str, as_field: &str) -> Self {
        Stage::Lookup {
            from: from.to_string(),
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: as_field.to_string(),
        }
    }
}
