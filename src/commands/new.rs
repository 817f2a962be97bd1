//! Create a new letter

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::content::is_valid_slug;
use crate::Letterbox;

/// Write a letter scaffold and return its path
///
/// The slug defaults to the slugified subject. Existing files are never
/// overwritten.
pub fn create_letter(
    app: &Letterbox,
    subject: &str,
    slug: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<PathBuf> {
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(subject),
    };

    if !is_valid_slug(&slug) {
        anyhow::bail!("Invalid slug: {:?}", slug);
    }

    fs::create_dir_all(&app.letters_dir)?;

    let file_path = app.letters_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // Quote the subject so colons and the like survive YAML
    let content = format!(
        "---\nsubject: {}\npublish_date: {}\n---\n\n",
        serde_json::to_string(subject)?,
        date.format("%Y-%m-%d")
    );
    fs::write(&file_path, content)?;

    tracing::info!("Created letter {:?}", file_path);
    Ok(file_path)
}

/// Run the new command
pub fn run(app: &Letterbox, subject: &str, slug: Option<&str>, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(d) => Some(
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("Invalid date {:?}: {}", d, e))?,
        ),
        None => None,
    };

    let path = create_letter(app, subject, slug, date)?;
    println!("Created: {}", path.display());
    Ok(())
}
