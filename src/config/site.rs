//! Archive configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ArchiveError, Result};

/// Main archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    // Site
    pub title: String,
    pub description: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub letters_dir: String,
    pub assets_dir: String,

    // Writing
    pub render_drafts: bool,

    // Date format (Moment.js tokens)
    pub date_format: String,

    #[serde(default)]
    pub markdown: MarkdownConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            title: "Letters".to_string(),
            description: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            letters_dir: "letters".to_string(),
            assets_dir: "assets".to_string(),

            render_drafts: false,

            date_format: "MMMM D, YYYY".to_string(),

            markdown: MarkdownConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl ArchiveConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: ArchiveConfig = serde_yaml::from_str(&content)?;
        config.normalize()?;
        Ok(config)
    }

    /// Make `root` start and end with a slash
    fn normalize(&mut self) -> Result<()> {
        let trimmed = self.root.trim().trim_matches('/');
        if trimmed.contains("//") || trimmed.contains(char::is_whitespace) {
            return Err(ArchiveError::Config(format!(
                "invalid root path: {:?}",
                self.root
            )));
        }
        self.root = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        Ok(())
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Escape raw HTML that is not on the allow-list
    pub sanitize: bool,
    pub highlight: bool,
    pub line_number: bool,
    /// syntect theme name
    pub theme: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            sanitize: true,
            highlight: true,
            line_number: false,
            theme: "InspiredGitHub".to_string(),
        }
    }
}

/// Defaults for the `serve` command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArchiveConfig::default();
        assert_eq!(config.title, "Letters");
        assert_eq!(config.root, "/");
        assert_eq!(config.letters_dir, "letters");
        assert!(config.markdown.sanitize);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Field Notes
date_format: YYYY-MM-DD
markdown:
  line_number: true
server:
  port: 8080
"#;
        let config: ArchiveConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Field Notes");
        assert_eq!(config.date_format, "YYYY-MM-DD");
        assert!(config.markdown.line_number);
        assert!(config.markdown.sanitize);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "localhost");
    }

    #[test]
    fn test_load_normalizes_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "root: blog\n").unwrap();

        let config = ArchiveConfig::load(&path).unwrap();
        assert_eq!(config.root, "/blog/");
    }

    #[test]
    fn test_load_rejects_bad_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "root: a//b\n").unwrap();

        let err = ArchiveConfig::load(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
    }
}
