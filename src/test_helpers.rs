//! Shared test utilities for the colophon test suite.
//!
//! Provides fixture setup and record lookup helpers for tests that work
//! with load-stage data (`Manifest`, `Record`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = load::load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();
//!
//! let post = find_record(&manifest, "posts", "hello-world");
//! assert_eq!(post.str_field("title"), Some("Hello, World"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::load::Manifest;
use crate::record::Record;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other
/// tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a content file under the temp content root, creating parent
/// directories as needed.
pub fn write_record(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

// =========================================================================
// Manifest lookups — panics with a clear message on miss
// =========================================================================

/// Find a record by collection and slug. Panics if not found.
pub fn find_record<'a>(manifest: &'a Manifest, collection: &str, slug: &str) -> &'a Record {
    manifest
        .records(collection)
        .iter()
        .find(|r| r.slug == slug)
        .unwrap_or_else(|| {
            let slugs = record_slugs(manifest, collection);
            panic!("record '{slug}' not found in '{collection}'. Available: {slugs:?}")
        })
}

/// All slugs of a collection, in manifest order.
pub fn record_slugs<'a>(manifest: &'a Manifest, collection: &str) -> Vec<&'a str> {
    manifest
        .records(collection)
        .iter()
        .map(|r| r.slug.as_str())
        .collect()
}
