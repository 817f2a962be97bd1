//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::ArchiveConfig;

/// Characters left as-is in a single path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/letters") // -> "/newsletter/letters"
/// ```
pub fn url_for(config: &ArchiveConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Path of the archive index
pub fn letters_url(config: &ArchiveConfig) -> String {
    url_for(config, "letters")
}

/// Path of a single letter page
pub fn letter_url(config: &ArchiveConfig, slug: &str) -> String {
    url_for(config, &format!("letters/{}", encode_segment(slug)))
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
