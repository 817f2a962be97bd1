//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded in the binary. Autoescaping stays on for
//! every `.html` template; the letter body is marked `safe` because the
//! transformer has already sanitized it.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::ArchiveConfig;
use crate::content::{LetterSummary, RenderModel};
use crate::error::Result;
use crate::helpers::{excerpt, format_date, letter_url, letters_url};

/// Length of the generated meta description
const DESCRIPTION_LENGTH: usize = 160;

/// Renders letter pages and the archive index
pub struct PageRenderer {
    tera: Tera,
    config: ArchiveConfig,
}

impl PageRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("letterbox/layout.html")),
            ("letter.html", include_str!("letterbox/letter.html")),
            ("index.html", include_str!("letterbox/index.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            config: config.clone(),
        })
    }

    /// Render the page for one letter
    pub fn render_letter(&self, letter: &RenderModel) -> Result<String> {
        let mut context = self.base_context();
        context.insert("letter", letter);
        context.insert(
            "description",
            &excerpt(&letter.body_html, DESCRIPTION_LENGTH),
        );
        Ok(self.tera.render("letter.html", &context)?)
    }

    /// Render the archive index
    pub fn render_index(&self, letters: &[LetterSummary]) -> Result<String> {
        let entries: Vec<IndexEntry> = letters
            .iter()
            .map(|letter| IndexEntry {
                subject: &letter.subject,
                publish_date: letter.publish_date,
                path: letter_url(&self.config, &letter.slug),
            })
            .collect();

        let mut context = self.base_context();
        context.insert("letters", &entries);
        Ok(self.tera.render("index.html", &context)?)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: &self.config.title,
                description: &self.config.description,
                url: &self.config.url,
            },
        );
        context.insert("letters_url", &letters_url(&self.config));
        context.insert("date_format", &self.config.date_format);
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }
}

#[derive(Debug, Serialize)]
struct SiteData<'a> {
    title: &'a str,
    description: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct IndexEntry<'a> {
    subject: &'a str,
    publish_date: NaiveDate,
    path: String,
}

/// Tera filter: format a `YYYY-MM-DD` date with Moment.js tokens
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Ok(tera::Value::String(format_date(&date, &format))),
        // Not a date we know; show it as-is
        Err(_) => Ok(tera::Value::String(s)),
    }
}
