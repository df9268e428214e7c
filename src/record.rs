//! Shared record types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (load → generate)
//! and must be identical across all consuming modules. A [`Record`] is
//! immutable after validation: downstream stages read it, never mutate it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated front-matter value.
///
/// The loader converts raw TOML values into this shape, so downstream
/// code never sees untyped data. Each variant corresponds to one field
/// kind in the collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Number(f64),
    Date(NaiveDate),
    /// Slugs into another collection, in declared order.
    References(Vec<String>),
    Nested(BTreeMap<String, FieldValue>),
}

/// One validated entry within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the collection this record belongs to.
    pub collection: String,
    /// Derived identifier, unique within the collection (path-based).
    pub slug: String,
    /// Source path relative to the content root, for error reporting.
    pub source_path: String,
    /// Validated front-matter fields.
    pub fields: BTreeMap<String, FieldValue>,
    /// Markdown body, if the source file had one after the front matter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Record {
    /// String field accessor. `None` if absent or a different kind.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Date field accessor. `None` if absent or a different kind.
    pub fn date_field(&self, name: &str) -> Option<NaiveDate> {
        match self.fields.get(name) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// Number field accessor. `None` if absent or a different kind.
    pub fn number_field(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Reference-list field accessor. `None` if absent or a different kind.
    pub fn reference_field(&self, name: &str) -> Option<&[String]> {
        match self.fields.get(name) {
            Some(FieldValue::References(slugs)) => Some(slugs),
            _ => None,
        }
    }

    /// Nested-table field accessor. `None` if absent or a different kind.
    pub fn nested_field(&self, name: &str) -> Option<&BTreeMap<String, FieldValue>> {
        match self.fields.get(name) {
            Some(FieldValue::Nested(table)) => Some(table),
            _ => None,
        }
    }
}
