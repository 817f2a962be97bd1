//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::sanitize::{clean_html, is_safe_html};
use crate::config::MarkdownConfig;
use crate::error::Result;
use crate::helpers::html_escape;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
    sanitize: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&MarkdownConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &MarkdownConfig) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(&config.theme) {
            tracing::warn!(
                "Unknown highlight theme {:?}, falling back to a default",
                config.theme
            );
        }

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name: config.theme.clone(),
            highlight: config.highlight,
            line_numbers: config.line_number,
            sanitize: config.sanitize,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();
        // Raw HTML blocks arrive one line per event; check them whole
        let mut html_block: Option<String> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => lang
                            .split_whitespace()
                            .next()
                            .map(|l| l.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let block = self.code_block(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::HtmlBlock) if self.sanitize => {
                    html_block = Some(String::new());
                }
                Event::Html(raw) if html_block.is_some() => {
                    if let Some(block) = html_block.as_mut() {
                        block.push_str(&raw);
                    }
                }
                Event::End(TagEnd::HtmlBlock) if self.sanitize => {
                    if let Some(block) = html_block.take() {
                        if is_safe_html(&block) {
                            events.push(Event::Html(CowStr::from(block)));
                        } else {
                            tracing::debug!("Escaping raw HTML block: {:?}", block);
                            events.push(Event::Text(CowStr::from(block)));
                        }
                    }
                }
                Event::InlineHtml(raw) if self.sanitize && !is_safe_html(&raw) => {
                    tracing::debug!("Escaping inline HTML: {:?}", raw);
                    events.push(Event::Text(raw));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        if self.sanitize {
            html_output = clean_html(&html_output);
        }

        let trimmed_len = html_output.trim_end().len();
        html_output.truncate(trimmed_len);
        Ok(html_output)
    }

    /// Render a fenced or indented code block
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        if !self.highlight {
            return plain_code_block(code, lang);
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme() else {
            return plain_code_block(code, lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => {
                add_line_numbers(&highlighted, code.lines().count(), lang)
            }
            Ok(highlighted) => highlighted,
            Err(e) => {
                tracing::warn!("Highlighting {} failed: {}", lang, e);
                plain_code_block(code, lang)
            }
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        html_escape(lang),
        html_escape(code)
    )
}

/// Wrap highlighted code in a two-column table with a line-number gutter
fn add_line_numbers(code: &str, line_count: usize, lang: &str) -> String {
    let line_count = line_count.max(1);
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        html_escape(lang),
        gutter,
        code.trim_end()
    )
}
