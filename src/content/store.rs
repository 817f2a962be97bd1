//! Content stores - where letters come from

use chrono::Local;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::letter::is_valid_slug;
use super::{FrontMatter, Letter};
use crate::error::Result;

/// Looks letters up by slug
pub trait ContentStore: Send + Sync {
    /// Fetch the letter with this slug, `None` when there is none
    fn get_by_slug(&self, slug: &str) -> Result<Option<Letter>>;

    /// Every letter the store holds, in no particular order
    fn list(&self) -> Result<Vec<Letter>>;
}

/// Reads letters from `<letters_dir>/<slug>.md`
#[derive(Debug, Clone)]
pub struct FileStore {
    letters_dir: PathBuf,
    render_drafts: bool,
}

impl FileStore {
    /// Create a store over a letters directory
    pub fn new<P: AsRef<Path>>(letters_dir: P, render_drafts: bool) -> Self {
        Self {
            letters_dir: letters_dir.as_ref().to_path_buf(),
            render_drafts,
        }
    }

    /// Load a letter file; `None` for drafts that should stay hidden
    fn load_letter(&self, path: &Path) -> Result<Option<Letter>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.draft && !self.render_drafts {
            tracing::debug!("Skipping draft {:?}", path);
            return Ok(None);
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let publish_date = match fm.parse_publish_date() {
            Some(date) => date,
            None => {
                if let Some(raw) = &fm.publish_date {
                    tracing::warn!("Unparseable publish_date {:?} in {:?}", raw, path);
                }
                file_modified_date(path)?
            }
        };

        let slug = fm
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| stem.clone());
        let subject = fm.subject.unwrap_or(stem);

        Ok(Some(Letter::new(slug, subject, publish_date, body)))
    }

    /// Markdown files directly inside the letters directory
    fn letter_files(&self) -> Vec<PathBuf> {
        if !self.letters_dir.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&self.letters_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .collect()
    }
}

impl ContentStore for FileStore {
    fn get_by_slug(&self, slug: &str) -> Result<Option<Letter>> {
        if !is_valid_slug(slug) {
            return Ok(None);
        }

        for ext in ["md", "markdown"] {
            let path = self.letters_dir.join(format!("{}.{}", slug, ext));
            if !path.is_file() {
                continue;
            }
            if let Some(letter) = self.load_letter(&path)? {
                if letter.slug == slug {
                    return Ok(Some(letter));
                }
            }
        }

        // Fall back to front-matter slugs that differ from the file name
        Ok(self
            .list()?
            .into_iter()
            .find(|letter| letter.slug == slug))
    }

    fn list(&self) -> Result<Vec<Letter>> {
        let mut by_slug: BTreeMap<String, (u8, Letter)> = BTreeMap::new();

        for path in self.letter_files() {
            match self.load_letter(&path) {
                Ok(Some(letter)) => {
                    let rank = slug_rank(&path, &letter.slug);
                    match by_slug.get(&letter.slug).map(|(held, _)| *held <= rank) {
                        Some(true) => {
                            tracing::warn!(
                                "Duplicate slug {:?} in {:?}, ignoring",
                                letter.slug,
                                path
                            );
                        }
                        Some(false) => {
                            tracing::warn!(
                                "Duplicate slug {:?}, {:?} takes precedence",
                                letter.slug,
                                path
                            );
                            by_slug.insert(letter.slug.clone(), (rank, letter));
                        }
                        None => {
                            by_slug.insert(letter.slug.clone(), (rank, letter));
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to load letter {:?}: {}", path, e);
                }
            }
        }

        Ok(by_slug.into_values().map(|(_, letter)| letter).collect())
    }
}

/// Letters held in memory, keyed by slug
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    letters: BTreeMap<String, Letter>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a letter, replacing any letter with the same slug
    pub fn insert(&mut self, letter: Letter) -> Option<Letter> {
        self.letters.insert(letter.slug.clone(), letter)
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl FromIterator<Letter> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Letter>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for letter in iter {
            store.insert(letter);
        }
        store
    }
}

impl ContentStore for MemoryStore {
    fn get_by_slug(&self, slug: &str) -> Result<Option<Letter>> {
        Ok(self.letters.get(slug).cloned())
    }

    fn list(&self) -> Result<Vec<Letter>> {
        Ok(self.letters.values().cloned().collect())
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Which file wins when several claim one slug, lowest first.
///
/// Matches the order `get_by_slug` tries paths in: `<slug>.md`, then
/// `<slug>.markdown`, then any other file by name.
fn slug_rank(path: &Path, slug: &str) -> u8 {
    let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(slug);
    match (stem_matches, path.extension().and_then(|e| e.to_str())) {
        (true, Some("md")) => 0,
        (true, _) => 1,
        _ => 2,
    }
}

fn file_modified_date(path: &Path) -> Result<chrono::NaiveDate> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(chrono::DateTime::<Local>::from(modified).date_naive())
}
