//! Collection schemas and the schema registry.
//!
//! Every collection declares its shape up front: a mapping from field
//! name to a [`FieldSpec`] (a tagged [`FieldKind`] plus a required flag).
//! Validation in the load stage is a single recursive match over the
//! kind variant — there is no duck typing and no "unknown field slides
//! through" path.
//!
//! ## Built-in collections
//!
//! The site ships eight collections. Two are content-bearing and routed
//! to their own pages (`posts`, `talks`); the rest are data-only and
//! exist to be referenced:
//!
//! ```text
//! posts         title, date, description, updated?, hero? {src, alt?}
//! talks         title, date, events -> [events], description?, slides?, video?
//! events        name, date, location?, url?
//! sponsors      name, url?, tier?, weight?
//! hardware      name, category?, description?
//! services      name, description?, url?
//! software      name, description?, url?
//! testimonials  quote, author, role?
//! ```
//!
//! Registering the same collection name twice is an error — schemas are
//! declared once at build configuration time and are immutable after.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("collection '{0}' is already registered")]
    DuplicateCollection(String),
}

/// The recognized set of field constraints.
///
/// `References` carries the name of the target collection; resolution
/// happens after all collections have loaded. `Nested` carries a full
/// sub-schema and validates recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Date,
    References { collection: String },
    Nested { schema: Schema },
}

/// One field constraint: a kind plus whether the field must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub required: bool,
}

/// The shape of every record in one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: BTreeMap<String, FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field. Builder-style, consumed and returned.
    pub fn required(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields
            .insert(name.to_string(), FieldSpec { kind, required: true });
        self
    }

    /// Add an optional field.
    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields
            .insert(name.to_string(), FieldSpec { kind, required: false });
        self
    }

    /// Field names that are reference lists, with their target collection.
    pub fn reference_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(name, spec)| match &spec.kind {
            FieldKind::References { collection } => Some((name.as_str(), collection.as_str())),
            _ => None,
        })
    }
}

/// A registered collection: its schema plus whether records get routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDef {
    pub name: String,
    pub schema: Schema,
    /// Routed collections produce one output page per record; data-only
    /// collections are keyed by slug but never rendered standalone.
    pub routed: bool,
}

/// Registry of collection definitions, keyed by name.
///
/// Declared once before loading; the loader and resolver look schemas up
/// here and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    defs: BTreeMap<String, CollectionDef>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection schema. Fails if the name is taken.
    pub fn define(&mut self, name: &str, schema: Schema, routed: bool) -> Result<(), SchemaError> {
        if self.defs.contains_key(name) {
            return Err(SchemaError::DuplicateCollection(name.to_string()));
        }
        self.defs.insert(
            name.to_string(),
            CollectionDef { name: name.to_string(), schema, routed },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CollectionDef> {
        self.defs.get(name)
    }

    /// All definitions, in name order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionDef> {
        self.defs.values()
    }

    /// The site's built-in collections.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let hero = Schema::new()
            .required("src", FieldKind::String)
            .optional("alt", FieldKind::String);

        // define() cannot fail here: names are distinct literals.
        let defs: [(&str, Schema, bool); 8] = [
            (
                "posts",
                Schema::new()
                    .required("title", FieldKind::String)
                    .required("date", FieldKind::Date)
                    .required("description", FieldKind::String)
                    .optional("updated", FieldKind::Date)
                    .optional("hero", FieldKind::Nested { schema: hero }),
                true,
            ),
            (
                "talks",
                Schema::new()
                    .required("title", FieldKind::String)
                    .required("date", FieldKind::Date)
                    .required(
                        "events",
                        FieldKind::References { collection: "events".to_string() },
                    )
                    .optional("description", FieldKind::String)
                    .optional("slides", FieldKind::String)
                    .optional("video", FieldKind::String),
                true,
            ),
            (
                "events",
                Schema::new()
                    .required("name", FieldKind::String)
                    .required("date", FieldKind::Date)
                    .optional("location", FieldKind::String)
                    .optional("url", FieldKind::String),
                false,
            ),
            (
                "sponsors",
                Schema::new()
                    .required("name", FieldKind::String)
                    .optional("url", FieldKind::String)
                    .optional("tier", FieldKind::String)
                    .optional("weight", FieldKind::Number),
                false,
            ),
            (
                "hardware",
                Schema::new()
                    .required("name", FieldKind::String)
                    .optional("category", FieldKind::String)
                    .optional("description", FieldKind::String),
                false,
            ),
            (
                "services",
                Schema::new()
                    .required("name", FieldKind::String)
                    .optional("description", FieldKind::String)
                    .optional("url", FieldKind::String),
                false,
            ),
            (
                "software",
                Schema::new()
                    .required("name", FieldKind::String)
                    .optional("description", FieldKind::String)
                    .optional("url", FieldKind::String),
                false,
            ),
            (
                "testimonials",
                Schema::new()
                    .required("quote", FieldKind::String)
                    .required("author", FieldKind::String)
                    .optional("role", FieldKind::String),
                false,
            ),
        ];

        for (name, schema, routed) in defs {
            registry
                .define(name, schema, routed)
                .unwrap_or_else(|_| unreachable!("builtin names are distinct"));
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_registers_collection() {
        let mut registry = SchemaRegistry::new();
        let schema = Schema::new().required("title", FieldKind::String);
        registry.define("notes", schema, true).unwrap();

        let def = registry.get("notes").unwrap();
        assert_eq!(def.name, "notes");
        assert!(def.routed);
        assert!(def.schema.fields.contains_key("title"));
    }

    #[test]
    fn duplicate_collection_is_error() {
        let mut registry = SchemaRegistry::new();
        registry.define("notes", Schema::new(), true).unwrap();

        let result = registry.define("notes", Schema::new(), false);
        assert!(matches!(result, Err(SchemaError::DuplicateCollection(name)) if name == "notes"));
    }

    #[test]
    fn builtin_has_all_eight_collections() {
        let registry = SchemaRegistry::builtin();
        let names: Vec<&str> = registry.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "events",
                "hardware",
                "posts",
                "services",
                "software",
                "sponsors",
                "talks",
                "testimonials"
            ]
        );
    }

    #[test]
    fn only_posts_and_talks_are_routed() {
        let registry = SchemaRegistry::builtin();
        let routed: Vec<&str> = registry
            .iter()
            .filter(|d| d.routed)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(routed, vec!["posts", "talks"]);
    }

    #[test]
    fn talks_reference_events() {
        let registry = SchemaRegistry::builtin();
        let talks = registry.get("talks").unwrap();
        let refs: Vec<(&str, &str)> = talks.schema.reference_fields().collect();
        assert_eq!(refs, vec![("events", "events")]);
    }

    #[test]
    fn required_and_optional_flags() {
        let registry = SchemaRegistry::builtin();
        let posts = &registry.get("posts").unwrap().schema;
        assert!(posts.fields["title"].required);
        assert!(posts.fields["date"].required);
        assert!(!posts.fields["updated"].required);
        assert!(!posts.fields["hero"].required);
    }

    #[test]
    fn nested_schema_shape() {
        let registry = SchemaRegistry::builtin();
        let posts = &registry.get("posts").unwrap().schema;
        match &posts.fields["hero"].kind {
            FieldKind::Nested { schema } => {
                assert!(schema.fields["src"].required);
                assert!(!schema.fields["alt"].required);
            }
            other => panic!("expected nested kind, got {other:?}"),
        }
    }
}
