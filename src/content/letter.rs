//! Letter models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One newsletter issue as held by a content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    /// Unique, URL-safe identifier
    pub slug: String,

    /// Display title
    pub subject: String,

    /// Calendar date the letter went out
    pub publish_date: NaiveDate,

    /// Source content (markdown, may contain inline HTML)
    pub body: String,
}

impl Letter {
    /// Create a new letter
    pub fn new(
        slug: impl Into<String>,
        subject: impl Into<String>,
        publish_date: NaiveDate,
        body: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            subject: subject.into(),
            publish_date,
            body: body.into(),
        }
    }
}

/// The data a letter page needs, derived from a [`Letter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    pub slug: String,
    pub subject: String,
    pub publish_date: NaiveDate,

    /// Sanitized HTML, inserted into the page as-is
    pub body_html: String,
}

/// A letter as shown in the archive listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterSummary {
    pub slug: String,
    pub subject: String,
    pub publish_date: NaiveDate,
}

impl From<&Letter> for LetterSummary {
    fn from(letter: &Letter) -> Self {
        Self {
            slug: letter.slug.clone(),
            subject: letter.subject.clone(),
            publish_date: letter.publish_date,
        }
    }
}

/// Whether a slug can name a letter at all
///
/// Rejects the empty string and anything that could step outside a
/// letters directory.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && !slug.contains("..")
        && !slug.contains(['/', '\\', '\0'])
}

/// Sort newest first, ties broken by slug
pub fn sort_newest_first(summaries: &mut [LetterSummary]) {
    summaries.sort_by(|a, b| {
        b.publish_date
            .cmp(&a.publish_date)
            .then_with(|| a.slug.cmp(&b.slug))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(slug: &str, y: i32, m: u32, d: u32) -> LetterSummary {
        LetterSummary {
            slug: slug.to_string(),
            subject: slug.to_uppercase(),
            publish_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[test]
    fn test_summary_from_letter() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        let letter = Letter::new("spring", "Spring Update", date, "Hello");
        let summary = LetterSummary::from(&letter);
        assert_eq!(summary.slug, "spring");
        assert_eq!(summary.subject, "Spring Update");
        assert_eq!(summary.publish_date, date);
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("2023-01-spring-update"));
        assert!(is_valid_slug("does-not-exist"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../secret"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("a\\b"));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut list = vec![
            summary("b", 2023, 1, 15),
            summary("c", 2024, 3, 1),
            summary("a", 2023, 1, 15),
        ];
        sort_newest_first(&mut list);
        let slugs: Vec<_> = list.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a", "b"]);
    }
}
