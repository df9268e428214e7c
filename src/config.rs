//! Site configuration module.
//!
//! Handles loading and validating `site.toml` from the content root.
//! Configuration is build-time only: it names the site for the feed and
//! rendered chrome, and anchors absolute links. There is no runtime or
//! per-directory layering — one file, read once per build.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "A Personal Site"        # Site/channel title
//! description = ""                 # Site/channel description
//! base_url = "https://example.com" # Absolute URL prefix for links
//! language = "en"                  # Feed language code
//! feed_path = "feed.xml"           # Feed location within the output dir
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used as the feed channel title and page header.
    pub title: String,
    /// Site description, used as the feed channel description.
    pub description: String,
    /// Absolute URL the site is published at. Feed links are derived
    /// from this, so trailing slashes are normalized away on load.
    pub base_url: String,
    /// Language code for the feed channel.
    pub language: String,
    /// Feed output path, relative to the output directory.
    pub feed_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "A Personal Site".to_string(),
            description: String::new(),
            base_url: "https://example.com".to_string(),
            language: "en".to_string(),
            feed_path: "feed.xml".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.feed_path.trim().is_empty() || self.feed_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "feed_path must be a relative path".into(),
            ));
        }
        Ok(())
    }
}

/// Load `site.toml` from the content root, falling back to defaults when
/// the file doesn't exist.
pub fn load_config(content_root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = content_root.join("site.toml");

    let mut config: SiteConfig = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };

    config.base_url = config.base_url.trim_end_matches('/').to_string();
    config.validate()?;
    Ok(config)
}

/// A stock `site.toml` with every option documented, for `gen-config`.
pub fn stock_config_toml() -> String {
    let defaults = SiteConfig::default();
    format!(
        r#"# colophon site configuration
# All options are optional - defaults shown.

# Site/channel title
title = "{title}"

# Site/channel description (feed channel description)
description = "{description}"

# Absolute URL the site is published at; feed links derive from this
base_url = "{base_url}"

# Feed language code
language = "{language}"

# Feed location within the output directory
feed_path = "{feed_path}"
"#,
        title = defaults.title,
        description = defaults.description,
        base_url = defaults.base_url,
        language = defaults.language,
        feed_path = defaults.feed_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "A Personal Site");
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.feed_path, "feed.xml");
    }

    #[test]
    fn partial_config_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("site.toml"), "title = \"Arthur's Site\"\n").unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Arthur's Site");
        assert_eq!(config.language, "en");
    }

    #[test]
    fn base_url_trailing_slash_normalized() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("site.toml"),
            "base_url = \"https://arthur.example/\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.base_url, "https://arthur.example");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("site.toml"), "tittle = \"typo\"\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn empty_title_fails_validation() {
        let config = SiteConfig { title: "  ".into(), ..SiteConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let config = SiteConfig { base_url: "ftp://example.com".into(), ..SiteConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn absolute_feed_path_fails_validation() {
        let config = SiteConfig { feed_path: "/feed.xml".into(), ..SiteConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn stock_config_parses_back() {
        let stock = stock_config_toml();
        let config: SiteConfig = toml::from_str(&stock).unwrap();
        assert_eq!(config.title, SiteConfig::default().title);
    }
}
