//! HTML site generation.
//!
//! Stage 3 of the colophon build pipeline. Consumes the validated
//! manifest, resolves references, projects routes, and writes the final
//! static site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): post list (newest first), talk
//!   list, sponsor and testimonial sections
//! - **Post pages** (`/posts/{slug}/index.html`): article body with
//!   optional hero image and updated-date note
//! - **Talk pages** (`/talks/{slug}/index.html`): talk details with the
//!   resolved "given at" event list, slides and video links
//! - **Feed** (`/feed.xml`): RSS projection of the posts collection
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── feed.xml
//! ├── posts/
//! │   ├── hello-world/index.html
//! │   └── 2024/year-in-review/index.html
//! └── talks/
//!     └── ship-it-safely/index.html
//! ```
//!
//! The renderer consumes the slug → record route mapping and resolved
//! references; it never re-validates or mutates records. HTML comes from
//! [maud](https://maud.lambda.xyz/) compile-time templates with
//! automatic XSS escaping; bodies are markdown via pulldown-cmark. CSS
//! is embedded at compile time.

use crate::config::SiteConfig;
use crate::feed;
use crate::load::Manifest;
use crate::record::{FieldValue, Record};
use crate::resolve::{self, CollectionRegistry, ResolveError, ResolvedRecord};
use crate::routes::{self, RouteError};
use crate::schema::SchemaRegistry;
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// What was written, for CLI reporting.
#[derive(Debug)]
pub struct GenerateSummary {
    /// (slug, output path) per generated post page, in slug order.
    pub post_routes: Vec<(String, String)>,
    /// (slug, output path) per generated talk page, in slug order.
    pub talk_routes: Vec<(String, String)>,
    pub feed_items: usize,
    pub feed_path: String,
}

const CSS: &str = include_str!("../static/style.css");

/// Generate the full site from a validated manifest.
pub fn generate(
    manifest: &Manifest,
    schemas: &SchemaRegistry,
    output_dir: &Path,
) -> Result<GenerateSummary, GenerateError> {
    let config = &manifest.config;

    // Slug-keyed view over every collection; also enforces uniqueness.
    let registry = CollectionRegistry::from_manifest(manifest)?;

    let posts = manifest.records("posts");
    let talks = resolve_collection(manifest, schemas, &registry, "talks")?;

    fs::create_dir_all(output_dir)?;

    // Index
    let index = render_index(manifest, &talks);
    fs::write(output_dir.join("index.html"), index.into_string())?;

    // Post pages, one directory per slug
    let post_routes = project_pages(output_dir, "posts", posts, |post| {
        render_post_page(config, post)
    })?;

    // Talk pages
    let talk_routes = project_pages_resolved(output_dir, "talks", &talks, |talk| {
        render_talk_page(config, talk)
    })?;

    // Feed
    let channel = feed::build_feed(config, posts);
    let feed_items = channel.items().len();
    let feed_path = output_dir.join(&config.feed_path);
    if let Some(parent) = feed_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&feed_path, channel.to_string())?;

    Ok(GenerateSummary {
        post_routes,
        talk_routes,
        feed_items,
        feed_path: config.feed_path.clone(),
    })
}

/// Resolve one collection's references against the registry.
fn resolve_collection(
    manifest: &Manifest,
    schemas: &SchemaRegistry,
    registry: &CollectionRegistry,
    name: &str,
) -> Result<Vec<ResolvedRecord>, ResolveError> {
    let schema = schemas
        .get(name)
        .map(|def| def.schema.clone())
        .unwrap_or_default();
    resolve::resolve_references(manifest.records(name), &schema, registry)
}

/// Write one page per slug under `<output>/<collection>/<slug>/index.html`.
fn project_pages(
    output_dir: &Path,
    collection: &str,
    records: &[Record],
    render: impl Fn(&Record) -> Markup,
) -> Result<Vec<(String, String)>, GenerateError> {
    let route_map = routes::project_routes(records)?;

    let mut written = Vec::new();
    for (slug, record) in &route_map {
        let page_dir = output_dir.join(routes::route_path(collection, slug));
        fs::create_dir_all(&page_dir)?;
        fs::write(page_dir.join("index.html"), render(record).into_string())?;
        written.push((slug.clone(), format!("{}index.html", routes::route_path(collection, slug))));
    }
    Ok(written)
}

/// Same as [`project_pages`] but over resolved records (talks need their
/// materialized event targets at render time).
fn project_pages_resolved(
    output_dir: &Path,
    collection: &str,
    resolved: &[ResolvedRecord],
    render: impl Fn(&ResolvedRecord) -> Markup,
) -> Result<Vec<(String, String)>, GenerateError> {
    let records: Vec<Record> = resolved.iter().map(|r| r.record.clone()).collect();
    // Collision check over the underlying records.
    routes::project_routes(&records)?;

    let mut ordered: Vec<&ResolvedRecord> = resolved.iter().collect();
    ordered.sort_by(|a, b| a.record.slug.cmp(&b.record.slug));

    let mut written = Vec::new();
    for item in ordered {
        let slug = &item.record.slug;
        let page_dir = output_dir.join(routes::route_path(collection, slug));
        fs::create_dir_all(&page_dir)?;
        fs::write(page_dir.join("index.html"), render(item).into_string())?;
        written.push((slug.clone(), format!("{}index.html", routes::route_path(collection, slug))));
    }
    Ok(written)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
fn base_document(config: &SiteConfig, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(config.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="alternate" type="application/rss+xml" href={ "/" (config.feed_path) };
                style { (CSS) }
            }
            body {
                header.site-header {
                    a.site-title href="/" { (config.title) }
                }
                (content)
            }
        }
    }
}

/// Markdown body to HTML. maud escapes everything by default, so the
/// converted HTML goes through `PreEscaped`.
fn markdown(source: &str) -> Markup {
    let parser = Parser::new(source);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    PreEscaped(out)
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%B %d, %Y").to_string()).unwrap_or_default()
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the index page: posts newest-first, talks, sponsors,
/// testimonials.
fn render_index(manifest: &Manifest, talks: &[ResolvedRecord]) -> Markup {
    let config = &manifest.config;

    let mut posts: Vec<&Record> = manifest.records("posts").iter().collect();
    posts.sort_by_key(|p| std::cmp::Reverse(p.date_field("date")));

    let mut sponsors: Vec<&Record> = manifest.records("sponsors").iter().collect();
    // Heavier sponsors first; name order breaks ties.
    sponsors.sort_by(|a, b| {
        let weight = |r: &Record| r.number_field("weight").unwrap_or(0.0);
        weight(b)
            .partial_cmp(&weight(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.str_field("name").cmp(&b.str_field("name")))
    });

    let testimonials = manifest.records("testimonials");

    let content = html! {
        main.index-page {
            @if !config.description.is_empty() {
                p.site-description { (config.description) }
            }
            section.posts {
                h2 { "Writing" }
                ul.post-list {
                    @for post in &posts {
                        li {
                            a href={ "/" (routes::route_path("posts", &post.slug)) } {
                                (post.str_field("title").unwrap_or(&post.slug))
                            }
                            span.date { (display_date(post.date_field("date"))) }
                            @if let Some(desc) = post.str_field("description") {
                                p.description { (desc) }
                            }
                        }
                    }
                }
            }
            @if !talks.is_empty() {
                section.talks {
                    h2 { "Talks" }
                    ul.talk-list {
                        @for talk in talks {
                            li {
                                a href={ "/" (routes::route_path("talks", &talk.record.slug)) } {
                                    (talk.record.str_field("title").unwrap_or(&talk.record.slug))
                                }
                                span.date { (display_date(talk.record.date_field("date"))) }
                            }
                        }
                    }
                }
            }
            @if !sponsors.is_empty() {
                section.sponsors {
                    h2 { "Sponsors" }
                    ul.sponsor-list {
                        @for sponsor in &sponsors {
                            li {
                                @if let Some(url) = sponsor.str_field("url") {
                                    a href=(url) { (sponsor.str_field("name").unwrap_or(&sponsor.slug)) }
                                } @else {
                                    (sponsor.str_field("name").unwrap_or(&sponsor.slug))
                                }
                                @if let Some(tier) = sponsor.str_field("tier") {
                                    span.tier { (tier) }
                                }
                            }
                        }
                    }
                }
            }
            @if !testimonials.is_empty() {
                section.testimonials {
                    h2 { "Kind Words" }
                    @for t in testimonials {
                        blockquote {
                            p { (t.str_field("quote").unwrap_or_default()) }
                            footer {
                                (t.str_field("author").unwrap_or_default())
                                @if let Some(role) = t.str_field("role") {
                                    ", " (role)
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(config, &config.title, content)
}

/// Renders a post article page.
fn render_post_page(config: &SiteConfig, post: &Record) -> Markup {
    let title = post.str_field("title").unwrap_or(&post.slug);

    let content = html! {
        main.post-page {
            article {
                header {
                    h1 { (title) }
                    p.meta {
                        time { (display_date(post.date_field("date"))) }
                        @if let Some(updated) = post.date_field("updated") {
                            span.updated { " (updated " (display_date(Some(updated))) ")" }
                        }
                    }
                }
                @if let Some(hero) = post.nested_field("hero") {
                    @if let Some(FieldValue::String(src)) = hero.get("src") {
                        @let alt = match hero.get("alt") {
                            Some(FieldValue::String(a)) => a.as_str(),
                            _ => "",
                        };
                        img.hero src=(src) alt=(alt);
                    }
                }
                @if let Some(body) = &post.body {
                    div.body { (markdown(body)) }
                }
            }
        }
    };

    base_document(config, title, content)
}

/// Renders a talk page with its resolved event list.
fn render_talk_page(config: &SiteConfig, talk: &ResolvedRecord) -> Markup {
    let record = &talk.record;
    let title = record.str_field("title").unwrap_or(&record.slug);
    let events = talk.targets("events");

    let content = html! {
        main.talk-page {
            article {
                header {
                    h1 { (title) }
                    p.meta {
                        time { (display_date(record.date_field("date"))) }
                    }
                }
                @if !events.is_empty() {
                    section.given-at {
                        h2 { "Given at" }
                        ul {
                            @for event in events {
                                li {
                                    @if let Some(url) = event.str_field("url") {
                                        a href=(url) { (event.str_field("name").unwrap_or(&event.slug)) }
                                    } @else {
                                        (event.str_field("name").unwrap_or(&event.slug))
                                    }
                                    @if let Some(location) = event.str_field("location") {
                                        span.location { " — " (location) }
                                    }
                                }
                            }
                        }
                    }
                }
                @if let Some(desc) = record.str_field("description") {
                    p.description { (desc) }
                }
                p.links {
                    @if let Some(slides) = record.str_field("slides") {
                        a href=(slides) { "Slides" }
                        " "
                    }
                    @if let Some(video) = record.str_field("video") {
                        a href=(video) { "Video" }
                    }
                }
                @if let Some(body) = &record.body {
                    div.body { (markdown(body)) }
                }
            }
        }
    };

    base_document(config, title, content)
}
