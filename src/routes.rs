//! Slug derivation and route projection.
//!
//! ## Slug Derivation
//!
//! A record's slug comes from its source path relative to the collection
//! directory: extension stripped, lower-cased, path separators preserved
//! as route segments. One content file, one slug, one route:
//!
//! ```text
//! posts/My-First-Post.md      → my-first-post
//! posts/2024/year-review.md   → 2024/year-review
//! ```
//!
//! Using the path verbatim (rather than a declared title) means renaming
//! a file is the only way to change a URL — there is no hidden state and
//! no way for two differently-titled files to silently share a route.
//!
//! ## Route Projection
//!
//! [`project_routes`] turns a validated collection into a slug → record
//! mapping. The mapping is the sole contract the page renderer consumes:
//! one output page per entry. Duplicate slugs (say, `About.md` and
//! `about.md` on a case-sensitive filesystem) abort the build instead of
//! letting one record shadow the other.
//!
//! Data-only collections go through the same projection for uniqueness
//! checking and reference lookup, but their mapping is never handed to
//! the renderer.

use crate::record::Record;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("slug collision in '{collection}': '{slug}' derived from both {first} and {second}")]
    SlugCollision {
        collection: String,
        slug: String,
        first: String,
        second: String,
    },
}

/// Derive a slug from a path relative to its collection directory.
///
/// Lower-cases each component, strips the extension from the final one,
/// and joins with `/` regardless of platform separator.
pub fn derive_slug(relative_path: &Path) -> String {
    let mut segments: Vec<String> = relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
        .collect();

    if let Some(last) = segments.last_mut() {
        *last = Path::new(last)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| last.clone());
    }

    segments.join("/")
}

/// Project a validated collection into its slug → record mapping.
pub fn project_routes(records: &[Record]) -> Result<BTreeMap<String, Record>, RouteError> {
    let mut routes: BTreeMap<String, Record> = BTreeMap::new();

    for record in records {
        if let Some(existing) = routes.get(&record.slug) {
            return Err(RouteError::SlugCollision {
                collection: record.collection.clone(),
                slug: record.slug.clone(),
                first: existing.source_path.clone(),
                second: record.source_path.clone(),
            });
        }
        routes.insert(record.slug.clone(), record.clone());
    }

    Ok(routes)
}

/// The output path for a routed record: `<collection>/<slug>/`.
pub fn route_path(collection: &str, slug: &str) -> String {
    format!("{collection}/{slug}/")
}
