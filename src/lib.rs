//! letterbox: a newsletter archive served from markdown letters
//!
//! A letter lives in `<letters_dir>/<slug>.md`. A request for
//! `/letters/<slug>` looks the letter up through a [`content::ContentStore`],
//! turns it into HTML with a [`content::ContentTransformer`] and renders it
//! with the embedded templates. Unknown slugs become a 404.

pub mod commands;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod server;
pub mod templates;

use std::path::{Path, PathBuf};

pub use controller::LetterController;
pub use error::{ArchiveError, Result};

/// The letterbox application rooted at one directory
#[derive(Debug, Clone)]
pub struct Letterbox {
    /// Archive configuration
    pub config: config::ArchiveConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding letter files
    pub letters_dir: PathBuf,
    /// Static asset directory
    pub assets_dir: PathBuf,
}

impl Letterbox {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            config::ArchiveConfig::load(&config_path)?
        } else {
            config::ArchiveConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::ArchiveConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let letters_dir = base_dir.join(&config.letters_dir);
        let assets_dir = base_dir.join(&config.assets_dir);

        Self {
            config,
            base_dir,
            letters_dir,
            assets_dir,
        }
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join("_config.yml")
    }

    /// File-backed store over the letters directory
    pub fn store(&self) -> content::FileStore {
        content::FileStore::new(&self.letters_dir, self.config.render_drafts)
    }

    /// Markdown transformer using the configured options
    pub fn transformer(&self) -> content::MarkdownTransformer {
        content::MarkdownTransformer::new(&self.config.markdown)
    }

    /// Page controller wired to the file store
    pub fn controller(&self) -> LetterController {
        LetterController::new(self.store(), self.transformer())
    }

    /// Page renderer using the configured site settings
    pub fn renderer(&self) -> Result<templates::PageRenderer> {
        templates::PageRenderer::new(&self.config)
    }

    /// Resolve a slug and render its page
    pub fn render_letter(&self, slug: &str) -> Result<String> {
        let model = self.controller().resolve(slug)?;
        self.renderer()?.render_letter(&model)
    }
}
