//! Front-matter splitting for content files.
//!
//! Every record is a single file: TOML front matter between `+++` fences,
//! followed by an optional markdown body.
//!
//! ```text
//! +++
//! title = "My First Post"
//! date = 2024-01-01
//! description = "Where it all began."
//! +++
//!
//! Body prose starts here.
//! ```
//!
//! The opening fence must be the first line of the file. The fence lines
//! themselves are exact (`+++` with nothing else on the line, trailing
//! whitespace tolerated). Everything after the closing fence is the body;
//! a body that is empty after trimming becomes `None`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("missing '+++' front matter opening on the first line")]
    MissingOpening,
    #[error("front matter is not terminated by a closing '+++'")]
    Unterminated,
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A split but not yet validated content file.
#[derive(Debug)]
pub struct RawDocument {
    /// Parsed front-matter table. Field types are still raw TOML values.
    pub front_matter: toml::Table,
    /// Markdown body, `None` when empty.
    pub body: Option<String>,
}

/// Split a source file into front matter and body.
pub fn split(source: &str) -> Result<RawDocument, FrontMatterError> {
    let mut lines = source.lines();

    match lines.next() {
        Some(first) if first.trim_end() == "+++" => {}
        _ => return Err(FrontMatterError::MissingOpening),
    }

    let mut front = String::new();
    let mut terminated = false;
    let mut body = String::new();

    for line in lines.by_ref() {
        if line.trim_end() == "+++" {
            terminated = true;
            break;
        }
        front.push_str(line);
        front.push('\n');
    }

    if !terminated {
        return Err(FrontMatterError::Unterminated);
    }

    for line in lines {
        body.push_str(line);
        body.push('\n');
    }

    let front_matter: toml::Table = toml::from_str(&front)?;
    let body = body.trim().to_string();
    let body = if body.is_empty() { None } else { Some(body) };

    Ok(RawDocument { front_matter, body })
}
