//! Collection loading and validation.
//!
//! Stage 1 of the colophon build pipeline. Walks one directory per
//! collection, parses each record's front matter, and type-checks it
//! against the collection schema, producing a [`Manifest`] that the
//! resolve and generate stages consume.
//!
//! ## Directory Structure
//!
//! Each registered collection maps to one directory under the content
//! root; each `.md` file inside is one record:
//!
//! ```text
//! content/
//! ├── site.toml                    # Site configuration (optional)
//! ├── posts/
//! │   ├── hello-world.md           # +++ TOML front matter +++ body
//! │   └── 2024/year-review.md      # Nested dirs become route segments
//! ├── talks/
//! │   └── ship-it-safely.md        # references events by slug
//! ├── events/
//! │   └── rustconf-2024.md         # data-only: front matter, no route
//! ├── sponsors/ …
//! └── testimonials/ …
//! ```
//!
//! A missing collection directory is an empty collection, not an error.
//!
//! ## Validation
//!
//! Validation is fail-fast: the first invalid record aborts the whole
//! collection load with the offending source path. There is no partial
//! or best-effort loading — a record either satisfies its schema exactly
//! or the build stops. Rules, per field spec:
//!
//! - Required fields must be present; unknown fields are rejected.
//! - Dates accept TOML date values or `YYYY-MM-DD` strings; anything
//!   else is a malformed-date error naming the field and value.
//! - Reference lists must be arrays of well-formed slugs (lowercase,
//!   no whitespace). Whether the slugs exist is the resolver's job.
//! - Nested tables validate recursively against their sub-schema, with
//!   dotted field paths (`hero.src`) in error messages.
//!
//! Collections are mutually independent until reference resolution, so
//! [`load_all`] validates them in parallel. That is an optimization
//! only; the resolver always runs after every collection has loaded.

use crate::config::{self, SiteConfig};
use crate::frontmatter::{self, FrontMatterError};
use crate::record::{FieldValue, Record};
use crate::routes;
use crate::schema::{CollectionDef, FieldKind, Schema, SchemaRegistry};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("front matter error in {path}: {source}")]
    FrontMatter {
        path: String,
        #[source]
        source: FrontMatterError,
    },
    #[error("schema violation in '{collection}' ({path}): {reason}")]
    Schema {
        collection: String,
        path: String,
        reason: String,
    },
    #[error(
        "malformed date in '{collection}' ({path}): field '{field}' is {value:?}, expected a calendar date (YYYY-MM-DD)"
    )]
    MalformedDate {
        collection: String,
        path: String,
        field: String,
        value: String,
    },
}

/// Manifest output from the load stage.
///
/// Serialized to JSON between stages so intermediate state stays
/// human-inspectable.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// Validated records per collection, in sorted source-path order.
    pub collections: BTreeMap<String, Vec<Record>>,
    pub config: SiteConfig,
}

impl Manifest {
    /// Records of one collection; empty slice if it has none.
    pub fn records(&self, collection: &str) -> &[Record] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Load and validate every registered collection.
///
/// Collections validate independently (in parallel); any single failure
/// aborts the whole load.
pub fn load_all(content_root: &Path, registry: &SchemaRegistry) -> Result<Manifest, LoadError> {
    let config = config::load_config(content_root)?;

    let defs: Vec<&CollectionDef> = registry.iter().collect();
    let loaded: Vec<(String, Vec<Record>)> = defs
        .par_iter()
        .map(|def| load_collection(content_root, def).map(|records| (def.name.clone(), records)))
        .collect::<Result<_, _>>()?;

    Ok(Manifest { collections: loaded.into_iter().collect(), config })
}

/// Load and validate a single collection directory.
pub fn load_collection(
    content_root: &Path,
    def: &CollectionDef,
) -> Result<Vec<Record>, LoadError> {
    let dir = content_root.join(&def.name);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(&dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e.file_name().to_string_lossy().as_ref()))
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || !has_md_extension(path) {
            continue;
        }

        let relative = path.strip_prefix(&dir).unwrap_or(path);
        let source_path = path
            .strip_prefix(content_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(path)?;
        let doc = frontmatter::split(&content).map_err(|source| LoadError::FrontMatter {
            path: source_path.clone(),
            source,
        })?;

        let fields = validate_table(&doc.front_matter, &def.schema, "").map_err(|err| {
            field_error_to_load_error(err, &def.name, &source_path)
        })?;

        records.push(Record {
            collection: def.name.clone(),
            slug: routes::derive_slug(relative),
            source_path,
            fields,
            body: doc.body,
        });
    }

    Ok(records)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn has_md_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Internal validation failure, mapped to a `LoadError` with collection
/// and source-path context at the call site.
#[derive(Debug)]
enum FieldError {
    Missing(String),
    Mistyped {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    Unknown(String),
    MalformedDate {
        field: String,
        value: String,
    },
    BadReference {
        field: String,
        value: String,
    },
}

fn field_error_to_load_error(err: FieldError, collection: &str, path: &str) -> LoadError {
    let (collection, path) = (collection.to_string(), path.to_string());
    match err {
        FieldError::Missing(field) => LoadError::Schema {
            collection,
            path,
            reason: format!("required field '{field}' is missing"),
        },
        FieldError::Mistyped { field, expected, found } => LoadError::Schema {
            collection,
            path,
            reason: format!("field '{field}' should be {expected}, found {found}"),
        },
        FieldError::Unknown(field) => LoadError::Schema {
            collection,
            path,
            reason: format!("unknown field '{field}'"),
        },
        FieldError::MalformedDate { field, value } => {
            LoadError::MalformedDate { collection, path, field, value }
        }
        FieldError::BadReference { field, value } => LoadError::Schema {
            collection,
            path,
            reason: format!("field '{field}' contains {value:?}, which is not a well-formed slug"),
        },
    }
}

/// Validate a front-matter table against a schema, recursively.
///
/// `prefix` is the dotted path of the enclosing nested field ("" at the
/// top level), used only for error messages.
fn validate_table(
    table: &toml::Table,
    schema: &Schema,
    prefix: &str,
) -> Result<BTreeMap<String, FieldValue>, FieldError> {
    let qualify = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    };

    for key in table.keys() {
        if !schema.fields.contains_key(key) {
            return Err(FieldError::Unknown(qualify(key)));
        }
    }

    let mut fields = BTreeMap::new();
    for (name, spec) in &schema.fields {
        let Some(raw) = table.get(name) else {
            if spec.required {
                return Err(FieldError::Missing(qualify(name)));
            }
            continue;
        };
        let value = validate_value(raw, &spec.kind, &qualify(name))?;
        fields.insert(name.clone(), value);
    }

    Ok(fields)
}

/// Type-check one raw TOML value against its field kind. A single match
/// over the kind variant; nesting recurses through `validate_table`.
fn validate_value(
    raw: &toml::Value,
    kind: &FieldKind,
    field: &str,
) -> Result<FieldValue, FieldError> {
    match kind {
        FieldKind::String => match raw {
            toml::Value::String(s) => Ok(FieldValue::String(s.clone())),
            other => Err(mistyped(field, "a string", other)),
        },
        FieldKind::Number => match raw {
            toml::Value::Integer(n) => Ok(FieldValue::Number(*n as f64)),
            toml::Value::Float(n) => Ok(FieldValue::Number(*n)),
            other => Err(mistyped(field, "a number", other)),
        },
        FieldKind::Date => parse_date(raw, field).map(FieldValue::Date),
        FieldKind::References { .. } => match raw {
            toml::Value::Array(items) => {
                let mut slugs = Vec::with_capacity(items.len());
                for item in items {
                    let toml::Value::String(slug) = item else {
                        return Err(mistyped(field, "an array of slug strings", item));
                    };
                    if !is_well_formed_slug(slug) {
                        return Err(FieldError::BadReference {
                            field: field.to_string(),
                            value: slug.clone(),
                        });
                    }
                    slugs.push(slug.clone());
                }
                Ok(FieldValue::References(slugs))
            }
            other => Err(mistyped(field, "an array of slug strings", other)),
        },
        FieldKind::Nested { schema } => match raw {
            toml::Value::Table(table) => {
                validate_table(table, schema, field).map(FieldValue::Nested)
            }
            other => Err(mistyped(field, "a table", other)),
        },
    }
}

fn mistyped(field: &str, expected: &'static str, found: &toml::Value) -> FieldError {
    FieldError::Mistyped {
        field: field.to_string(),
        expected,
        found: found.type_str(),
    }
}

/// Parse a date field: native TOML dates and `YYYY-MM-DD` strings both
/// work. Anything else — including time-only TOML values — is malformed.
fn parse_date(raw: &toml::Value, field: &str) -> Result<NaiveDate, FieldError> {
    let malformed = |value: String| FieldError::MalformedDate {
        field: field.to_string(),
        value,
    };

    match raw {
        toml::Value::Datetime(dt) => {
            let date = dt.date.ok_or_else(|| malformed(dt.to_string()))?;
            NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into())
                .ok_or_else(|| malformed(dt.to_string()))
        }
        toml::Value::String(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| malformed(s.clone()))
        }
        other => Err(malformed(other.to_string())),
    }
}

/// Reference slugs must look like slugs the projector could have derived:
/// lowercase, no whitespace, `/` allowed for nested routes.
fn is_well_formed_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.' | '/')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn fixture_content_loads_all_collections() {
        let tmp = setup_fixtures();
        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();

        assert_eq!(manifest.records("posts").len(), 3);
        assert_eq!(manifest.records("talks").len(), 2);
        assert_eq!(manifest.records("events").len(), 2);
        assert_eq!(manifest.records("sponsors").len(), 2);
        assert_eq!(manifest.records("testimonials").len(), 1);
    }

    #[test]
    fn missing_collection_dir_is_empty_not_error() {
        let tmp = setup_fixtures();
        std::fs::remove_dir_all(tmp.path().join("sponsors")).unwrap();

        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();
        assert!(manifest.records("sponsors").is_empty());
    }

    #[test]
    fn valid_record_loads_unchanged() {
        let tmp = setup_fixtures();
        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();

        let post = find_record(&manifest, "posts", "hello-world");
        assert_eq!(post.str_field("title"), Some("Hello, World"));
        assert_eq!(
            post.date_field("date"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(post.str_field("description"), Some("Where it all began."));
        assert!(post.body.as_deref().unwrap().contains("first post"));
    }

    #[test]
    fn nested_field_validates_recursively() {
        let tmp = setup_fixtures();
        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();

        let post = find_record(&manifest, "posts", "desk-setup");
        let hero = post.nested_field("hero").unwrap();
        assert_eq!(
            hero.get("src"),
            Some(&FieldValue::String("/images/desk.avif".into()))
        );
    }

    #[test]
    fn slugs_derived_from_relative_paths() {
        let tmp = setup_fixtures();
        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();

        let slugs = record_slugs(&manifest, "posts");
        assert!(slugs.contains(&"hello-world"));
        assert!(slugs.contains(&"2024/year-in-review"));
    }

    #[test]
    fn missing_required_field_fails_with_schema_error() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "posts/broken.md",
            "+++\ntitle = \"No Date\"\ndescription = \"d\"\n+++\n",
        );

        let result = load_all(tmp.path(), &SchemaRegistry::builtin());
        match result {
            Err(LoadError::Schema { collection, path, reason }) => {
                assert_eq!(collection, "posts");
                assert_eq!(path, "posts/broken.md");
                assert!(reason.contains("'date'"), "reason: {reason}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn mistyped_field_fails_with_schema_error() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "posts/broken.md",
            "+++\ntitle = 42\ndate = 2024-01-01\ndescription = \"d\"\n+++\n",
        );

        let result = load_all(tmp.path(), &SchemaRegistry::builtin());
        match result {
            Err(LoadError::Schema { reason, .. }) => {
                assert!(reason.contains("'title'"), "reason: {reason}");
                assert!(reason.contains("string"), "reason: {reason}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "posts/broken.md",
            "+++\ntitle = \"T\"\ndate = 2024-01-01\ndescription = \"d\"\npubdate = 2024-01-01\n+++\n",
        );

        let result = load_all(tmp.path(), &SchemaRegistry::builtin());
        match result {
            Err(LoadError::Schema { reason, .. }) => {
                assert!(reason.contains("'pubdate'"), "reason: {reason}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_fails_with_malformed_date() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "posts/broken.md",
            "+++\ntitle = \"T\"\ndate = \"January 1st\"\ndescription = \"d\"\n+++\n",
        );

        let result = load_all(tmp.path(), &SchemaRegistry::builtin());
        match result {
            Err(LoadError::MalformedDate { field, value, .. }) => {
                assert_eq!(field, "date");
                assert_eq!(value, "January 1st");
            }
            other => panic!("expected malformed date, got {other:?}"),
        }
    }

    #[test]
    fn date_string_form_is_accepted() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "posts/stringly.md",
            "+++\ntitle = \"T\"\ndate = \"2024-03-05\"\ndescription = \"d\"\n+++\n",
        );

        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();
        let post = find_record(&manifest, "posts", "stringly");
        assert_eq!(post.date_field("date"), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn reference_list_shape_is_checked_at_load() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "talks/broken.md",
            "+++\ntitle = \"T\"\ndate = 2024-01-01\nevents = [\"Has Spaces\"]\n+++\n",
        );

        let result = load_all(tmp.path(), &SchemaRegistry::builtin());
        match result {
            Err(LoadError::Schema { collection, reason, .. }) => {
                assert_eq!(collection, "talks");
                assert!(reason.contains("Has Spaces"), "reason: {reason}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn reference_existence_not_checked_at_load() {
        // Dangling references pass the loader; the resolver rejects them.
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "talks/dangling.md",
            "+++\ntitle = \"T\"\ndate = 2024-01-01\nevents = [\"missing-event\"]\n+++\n",
        );

        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();
        let talk = find_record(&manifest, "talks", "dangling");
        assert_eq!(
            talk.reference_field("events"),
            Some(&["missing-event".to_string()][..])
        );
    }

    #[test]
    fn nested_missing_required_uses_dotted_path() {
        let tmp = setup_fixtures();
        write_record(
            tmp.path(),
            "posts/broken.md",
            "+++\ntitle = \"T\"\ndate = 2024-01-01\ndescription = \"d\"\n[hero]\nalt = \"a desk\"\n+++\n",
        );

        let result = load_all(tmp.path(), &SchemaRegistry::builtin());
        match result {
            Err(LoadError::Schema { reason, .. }) => {
                assert!(reason.contains("'hero.src'"), "reason: {reason}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn hidden_files_are_skipped() {
        let tmp = setup_fixtures();
        write_record(tmp.path(), "posts/.draft.md", "not even front matter");

        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();
        assert!(!record_slugs(&manifest, "posts").iter().any(|s| s.contains("draft")));
    }

    #[test]
    fn non_markdown_files_are_skipped() {
        let tmp = setup_fixtures();
        write_record(tmp.path(), "posts/notes.txt", "scratch");

        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();
        assert_eq!(manifest.records("posts").len(), 3);
    }

    #[test]
    fn records_sorted_by_source_path() {
        let tmp = setup_fixtures();
        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();

        let paths: Vec<&str> = manifest
            .records("posts")
            .iter()
            .map(|r| r.source_path.as_str())
            .collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn manifest_json_round_trip() {
        let tmp = setup_fixtures();
        let manifest = load_all(tmp.path(), &SchemaRegistry::builtin()).unwrap();

        let json = serde_json::to_string_pretty(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(manifest.records("posts"), back.records("posts"));
        assert_eq!(manifest.records("talks"), back.records("talks"));
    }

    #[test]
    fn well_formed_slug_rules() {
        assert!(is_well_formed_slug("rustconf-2024"));
        assert!(is_well_formed_slug("2024/year-review"));
        assert!(is_well_formed_slug("v1.2_final"));
        assert!(!is_well_formed_slug(""));
        assert!(!is_well_formed_slug("Has-Upper"));
        assert!(!is_well_formed_slug("has space"));
    }
}
