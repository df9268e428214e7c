//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary
//! display for every record is its semantic identity — collection and
//! slug — with filesystem paths shown as secondary context via indented
//! `Source:` lines. This makes the output readable as a content
//! inventory while still letting users trace data back to files.
//!
//! # Output Format
//!
//! ## Load / Check
//!
//! ```text
//! Collections
//! posts (3 records)
//!     001 hello-world
//!         Source: posts/hello-world.md
//!     002 2024/year-in-review
//!         Source: posts/2024/year-in-review.md
//! events (2 records)
//!     001 rustconf-2024
//!         Source: events/rustconf-2024.md
//! ```
//!
//! ## Build
//!
//! ```text
//! posts
//!     hello-world → posts/hello-world/index.html
//! talks
//!     ship-it-safely → talks/ship-it-safely/index.html
//! Feed: feed.xml (3 items)
//! Generated 3 posts, 1 talk
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::generate::GenerateSummary;
use crate::load::Manifest;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{pos:0>3}")
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// Format the load-stage inventory: every collection, every record.
pub fn format_load_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];

    for (name, records) in &manifest.collections {
        lines.push(format!("{name} ({})", plural(records.len(), "record")));
        for (idx, record) in records.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(idx + 1), record.slug));
            lines.push(format!("{}Source: {}", indent(2), record.source_path));
        }
    }

    lines
}

pub fn print_load_output(manifest: &Manifest) {
    for line in format_load_output(manifest) {
        println!("{line}");
    }
}

/// Format the build-stage summary: routes written and feed status.
pub fn format_build_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (collection, routes) in [("posts", &summary.post_routes), ("talks", &summary.talk_routes)] {
        if routes.is_empty() {
            continue;
        }
        lines.push(collection.to_string());
        for (slug, path) in routes {
            lines.push(format!("{}{} → {}", indent(1), slug, path));
        }
    }

    lines.push(format!(
        "Feed: {} ({})",
        summary.feed_path,
        plural(summary.feed_items, "item")
    ));
    lines.push(format!(
        "Generated {}, {}",
        plural(summary.post_routes.len(), "post"),
        plural(summary.talk_routes.len(), "talk")
    ));

    lines
}

pub fn print_build_output(summary: &GenerateSummary) {
    for line in format_build_output(summary) {
        println!("{line}");
    }
}
