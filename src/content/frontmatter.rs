//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, Result};

/// Front-matter data at the top of a letter file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(alias = "title")]
    pub subject: Option<String>,
    #[serde(alias = "date")]
    pub publish_date: Option<String>,
    pub slug: Option<String>,
    pub draft: bool,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start();

        // YAML front-matter (---)
        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        // JSON front-matter (;;;)
        if content.starts_with(";;;") {
            return Self::parse_json(content);
        }

        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let rest = &content[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        let Some((fence_start, fence_end)) = closing_fence(rest) else {
            // No closing ---, treat as no front-matter
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..fence_start];
        let remaining = rest[fence_end..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading `---` may just be a thematic break
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content)
            .map_err(|e| ArchiveError::FrontMatter(format!("invalid YAML: {}", e)))?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        let rest = &content[3..];
        let Some(end_pos) = rest.find(";;;") else {
            return Err(ArchiveError::FrontMatter(
                "unterminated JSON front-matter".to_string(),
            ));
        };

        let json_content = rest[..end_pos].trim();
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        // The block may or may not carry its own braces
        let json_content = if json_content.starts_with('{') {
            json_content.to_string()
        } else {
            format!("{{{}}}", json_content)
        };

        let fm: FrontMatter = serde_json::from_str(&json_content)
            .map_err(|e| ArchiveError::FrontMatter(format!("invalid JSON: {}", e)))?;
        Ok((fm, remaining))
    }

    /// Parse the publish date, keeping only the calendar date
    pub fn parse_publish_date(&self) -> Option<NaiveDate> {
        self.publish_date.as_deref().and_then(parse_date_string)
    }
}

/// Byte range of the first line that is exactly `---`, trailing whitespace
/// allowed
fn closing_fence(block: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in block.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// At least one line has the shape `key: value`
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp" | "mailto");
        if !is_valid_key {
            return false;
        }
        let after_colon = &trimmed[colon_pos + 1..];
        after_colon.is_empty() || after_colon.starts_with(' ')
    })
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 keeps the date as written, not shifted to local time
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
