//! # Colophon
//!
//! A minimal content-collection build pipeline for personal sites.
//! Your filesystem is the data source: one directory per collection,
//! one markdown file per record, TOML front matter validated against a
//! declared schema before anything renders.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Colophon processes content through three stages in strict dependency
//! order, each consuming its predecessor's complete output:
//!
//! ```text
//! 1. Load      content/  →  manifest.json    (files → validated records)
//! 2. Resolve   manifest  →  resolved refs    (slugs → materialized records)
//! 3. Generate  manifest  →  dist/            (HTML pages + RSS feed)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Debuggability**: the load manifest is human-readable JSON you can
//!   inspect when a build surprises you.
//! - **Fail-fast correctness**: output is static, so a bad record has no
//!   opportunity to "fix itself" after publication. Every schema
//!   violation, malformed date, dangling reference, or slug collision
//!   aborts the build before a single page is written.
//! - **Testability**: each stage is a pure function over immutable
//!   inputs, so unit tests exercise pipeline logic without a full build.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Collection schemas: tagged field kinds, the registry, duplicate detection |
//! | [`frontmatter`] | `+++` TOML front-matter splitting |
//! | [`load`] | Stage 1 — walks collection directories, validates records, produces the manifest |
//! | [`resolve`] | Stage 2 — materializes cross-collection references (talk → events) |
//! | [`routes`] | Slug derivation and the slug → record route mapping |
//! | [`feed`] | RSS projection of the posts collection |
//! | [`generate`] | Stage 3 — renders the final HTML site with Maud |
//! | [`config`] | `site.toml` loading and validation |
//! | [`record`] | Shared types serialized between stages (`Record`, `FieldValue`) |
//! | [`output`] | CLI output formatting — content inventory and build summaries |
//!
//! # Design Decisions
//!
//! ## Schemas as Tagged Variants
//!
//! Field constraints are an enum ([`schema::FieldKind`]) rather than
//! duck-typed checks: string, number, date, reference list, nested
//! table. Validation is one recursive match over the variant, so the
//! set of representable constraints and the set of validated ones are
//! the same thing.
//!
//! ## Path-Derived Slugs
//!
//! A record's slug is its file path relative to the collection
//! directory, lower-cased, extension stripped. One content file, one
//! slug, one route; collisions are a build error. Data-only collections
//! (events, sponsors, hardware, services, software, testimonials) use
//! the same slugs as reference keys but are never routed to pages.
//!
//! ## Explicit Reference Registry
//!
//! The resolver takes a [`resolve::CollectionRegistry`] argument rather
//! than reaching into ambient state. The loader's output is the
//! resolver's input, visibly, and tests can hand-build registries.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a
//! compile-time HTML macro system:
//!
//! - **Compile-time checking**: malformed HTML is a build error.
//! - **Type-safe**: template variables are Rust expressions.
//! - **XSS-safe by default**: all interpolation is auto-escaped.
//! - **Zero runtime files**: no template directory to ship.
//!
//! ## Whole-Build Model
//!
//! There is no incremental recomputation: a content change means a full
//! rebuild. Collections validate in parallel (they are independent
//! until reference resolution), but that is an optimization — the
//! resolver always waits for every collection to finish loading.

pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod generate;
pub mod load;
pub mod output;
pub mod record;
pub mod resolve;
pub mod routes;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;
