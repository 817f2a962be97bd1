//! Render a single letter page without starting the server

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Letterbox;

/// Render the page for `slug` to a file, or to stdout when `output` is `None`
pub fn run(app: &Letterbox, slug: &str, output: Option<&Path>) -> Result<()> {
    let html = app.render_letter(slug)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, html)?;
            tracing::info!("Wrote {:?}", path);
        }
        None => print!("{}", html),
    }

    Ok(())
}
