//! Cross-collection reference resolution.
//!
//! Stage 2 of the colophon build pipeline. A talk names the events it
//! was given at as a list of slugs; this module materializes those slugs
//! into the actual event records, after every collection has loaded.
//!
//! Resolution takes an explicit [`CollectionRegistry`] — a slug-keyed
//! view over every validated collection — rather than any ambient
//! lookup, so the resolver is testable with hand-built registries and
//! its data dependency on the loader is visible in the signature.
//!
//! Two invariants hold for the output:
//!
//! - every declared slug resolves, or the build aborts naming the source
//!   record and the missing slug;
//! - resolved targets keep the declared order. The reference list is
//!   display order ("given at RustConf, then FOSDEM"), not a set.
//!
//! Records are immutable after validation, so targets are materialized
//! by cloning rather than shared borrows — the simpler representation
//! the immutability makes safe.

use crate::load::Manifest;
use crate::record::Record;
use crate::routes::{self, RouteError};
use crate::schema::Schema;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(
        "unresolved reference in '{collection}' ({path}): field '{field}' names '{slug}', which does not exist in '{target_collection}'"
    )]
    UnresolvedReference {
        collection: String,
        path: String,
        field: String,
        target_collection: String,
        slug: String,
    },
}

/// Slug-keyed view over every validated collection.
///
/// Building the registry is also where per-collection slug uniqueness is
/// enforced: the projection into a slug → record map rejects collisions
/// for data-only and routed collections alike.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    sets: BTreeMap<String, BTreeMap<String, Record>>,
}

impl CollectionRegistry {
    /// Project every collection in the manifest into slug-keyed sets.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, RouteError> {
        let mut registry = Self::default();
        for (name, records) in &manifest.collections {
            registry.insert(name, routes::project_routes(records)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, collection: &str, records: BTreeMap<String, Record>) {
        self.sets.insert(collection.to_string(), records);
    }

    pub fn lookup(&self, collection: &str, slug: &str) -> Option<&Record> {
        self.sets.get(collection)?.get(slug)
    }
}

/// A record plus its materialized reference targets, keyed by field name.
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub record: Record,
    /// Field name → resolved targets, in declared order.
    pub references: BTreeMap<String, Vec<Record>>,
}

impl ResolvedRecord {
    /// Resolved targets for one reference field; empty if none declared.
    pub fn targets(&self, field: &str) -> &[Record] {
        self.references.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Resolve every reference field of every record in a collection.
pub fn resolve_references(
    records: &[Record],
    schema: &Schema,
    registry: &CollectionRegistry,
) -> Result<Vec<ResolvedRecord>, ResolveError> {
    records
        .iter()
        .map(|record| {
            let mut references = BTreeMap::new();
            for (field, target_collection) in schema.reference_fields() {
                let Some(slugs) = record.reference_field(field) else {
                    continue;
                };
                let mut targets = Vec::with_capacity(slugs.len());
                for slug in slugs {
                    let target = registry.lookup(target_collection, slug).ok_or_else(|| {
                        ResolveError::UnresolvedReference {
                            collection: record.collection.clone(),
                            path: record.source_path.clone(),
                            field: field.to_string(),
                            target_collection: target_collection.to_string(),
                            slug: slug.clone(),
                        }
                    })?;
                    targets.push(target.clone());
                }
                references.insert(field.to_string(), targets);
            }
            Ok(ResolvedRecord { record: record.clone(), references })
        })
        .collect()
}
