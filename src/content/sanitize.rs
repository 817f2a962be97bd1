//! Sanitizing raw HTML embedded in letters
//!
//! [`is_safe_html`] decides whether a raw fragment is kept as markup or
//! escaped into visible text. [`clean_html`] filters the finished document
//! through ammonia's allow-list.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Tags a letter may carry as raw HTML
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del", "details",
    "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "img", "ins", "kbd", "li", "mark", "ol", "p", "picture", "pre", "q", "s", "small",
    "source", "span", "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "u", "ul",
];

/// Attributes kept per tag by [`clean_html`], on top of `class`, `id`,
/// `lang` and `title`
const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("blockquote", &["cite"]),
    ("details", &["open"]),
    ("img", &["src", "alt", "width", "height"]),
    // task list checkboxes
    ("input", &["type", "checked", "disabled"]),
    ("ol", &["start"]),
    ("pre", &["style"]),
    ("q", &["cite"]),
    ("source", &["src", "type", "media"]),
    ("span", &["style"]),
    ("td", &["style", "colspan", "rowspan"]),
    ("th", &["style", "colspan", "rowspan"]),
];

/// Inline styles emitted by syntax highlighting and aligned table columns
const STYLE_PROPERTIES: &[&str] = &[
    "background-color",
    "color",
    "font-style",
    "font-weight",
    "text-align",
    "text-decoration",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"</?\s*([A-Za-z][A-Za-z0-9-]*)").unwrap();
    static ref EVENT_ATTR_RE: Regex = Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap();
    static ref SCRIPT_URL_RE: Regex =
        Regex::new(r"(?i)(javascript|vbscript):|data:text/html").unwrap();
    static ref NUMERIC_ENTITY_RE: Regex =
        Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));?").unwrap();
}

/// Returns true when a fragment of raw HTML only uses allowed tags and
/// carries no event handlers or script URLs.
///
/// Entities are decoded and whitespace is dropped before looking for URL
/// schemes, since browsers ignore both inside a URL.
pub fn is_safe_html(fragment: &str) -> bool {
    let decoded = decode_entities(fragment);
    if EVENT_ATTR_RE.is_match(&decoded) {
        return false;
    }

    let compact: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    if SCRIPT_URL_RE.is_match(&compact) {
        return false;
    }

    TAG_RE.captures_iter(fragment).all(|caps| {
        let name = caps[1].to_ascii_lowercase();
        ALLOWED_TAGS.contains(&name.as_str())
    })
}

/// Parse rendered HTML and keep only allow-listed tags, attributes, styles
/// and URL schemes
pub fn clean_html(html: &str) -> String {
    let tags: HashSet<&str> = ALLOWED_TAGS
        .iter()
        .copied()
        .chain(std::iter::once("input"))
        .collect();
    let tag_attributes: HashMap<&str, HashSet<&str>> = TAG_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();

    let mut builder = ammonia::Builder::default();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .add_generic_attributes(&["class", "id"])
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .filter_style_properties(STYLE_PROPERTIES.iter().copied().collect())
        .link_rel(None);

    builder.clean(html).to_string()
}

/// Decode numeric character references and the named ones used to hide
/// URL schemes
fn decode_entities(s: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(s, |caps: &Captures| {
        let code = match caps.get(1) {
            Some(hex) => u32::from_str_radix(hex.as_str(), 16).ok(),
            None => caps.get(2).and_then(|dec| dec.as_str().parse().ok()),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    numeric
        .replace("&colon;", ":")
        .replace("&Tab;", "\t")
        .replace("&NewLine;", "\n")
        .replace("&lpar;", "(")
        .replace("&rpar;", ")")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_tags_allowed() {
        assert!(is_safe_html("<p>Hello</p>"));
        assert!(is_safe_html(r#"<a href="https://example.com">link</a>"#));
        assert!(is_safe_html("<IMG src=\"/a.png\" alt=\"\">"));
        assert!(is_safe_html("<!-- a comment -->"));
        assert!(is_safe_html("plain text"));
    }

    #[test]
    fn test_script_and_embeds_rejected() {
        assert!(!is_safe_html("<script>alert(1)</script>"));
        assert!(!is_safe_html("</script>"));
        assert!(!is_safe_html("<iframe src=\"x\"></iframe>"));
        assert!(!is_safe_html("<style>body{}</style>"));
    }

    #[test]
    fn test_event_handlers_and_urls_rejected() {
        assert!(!is_safe_html("<img src=x onerror=alert(1)>"));
        assert!(!is_safe_html("onload = go()"));
        assert!(!is_safe_html("<img src=x onerror\n=alert(1)>"));
        assert!(!is_safe_html(r#"<a href="javascript:alert(1)">x</a>"#));
        assert!(!is_safe_html(r#"<a href="data:text/html;base64,xx">x</a>"#));
    }

    #[test]
    fn test_disguised_script_urls_rejected() {
        assert!(!is_safe_html(r#"<a href="&#106;avascript:alert(1)">x</a>"#));
        assert!(!is_safe_html(r#"<a href="&#x6A;avascript:alert(1)">x</a>"#));
        assert!(!is_safe_html(r#"<a href="jav&#97;script&colon;alert(1)">x</a>"#));
        assert!(!is_safe_html(r#"<a href="java&#x09;script:alert(1)">x</a>"#));
        assert!(!is_safe_html("<a href=\"java\nscript:alert(1)\">x</a>"));
        assert!(!is_safe_html(r#"<a href=" JaVaScRiPt :alert(1)">x</a>"#));
        assert!(!is_safe_html(r#"<a href="VBScript:msgbox(1)">x</a>"#));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&#106;&#x61;&colon;"), "ja:");
        assert_eq!(decode_entities("&amp;#106;"), "&#106;");
        assert_eq!(decode_entities("&#xFFFFFF;x"), "x");
    }

    #[test]
    fn test_clean_html_drops_handlers_and_script_urls() {
        let html = clean_html(r#"<p><img src="x" onerror="alert(1)"></p>"#);
        assert_eq!(html, r#"<p><img src="x"></p>"#);

        let html = clean_html("<a href=\"java\nscript:alert(1)\">x</a>");
        assert!(!html.contains("script:"));
        assert!(html.contains(">x</a>"));

        let html = clean_html(r#"<a href="&#106;avascript:alert(1)">x</a>"#);
        assert!(!html.contains("href"));
    }

    #[test]
    fn test_clean_html_keeps_rendered_markup() {
        assert_eq!(clean_html("<p>Hello</p>"), "<p>Hello</p>");
        assert_eq!(
            clean_html(r#"<a href="https://example.com">two</a>"#),
            r#"<a href="https://example.com">two</a>"#
        );
        assert_eq!(
            clean_html(r#"<pre><code class="language-text">a &lt; b</code></pre>"#),
            r#"<pre><code class="language-text">a &lt; b</code></pre>"#
        );
        assert!(!clean_html("<script>alert(1)</script>").contains("alert"));
    }
}
