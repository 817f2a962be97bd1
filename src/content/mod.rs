//! Content module - letters, where they are stored and how they become HTML

mod frontmatter;
mod letter;
mod markdown;
mod sanitize;
pub mod store;
pub mod transformer;

pub use frontmatter::FrontMatter;
pub use letter::{is_valid_slug, sort_newest_first, Letter, LetterSummary, RenderModel};
pub use markdown::MarkdownRenderer;
pub use sanitize::is_safe_html;
pub use store::{ContentStore, FileStore, MemoryStore};
pub use transformer::{ContentTransformer, MarkdownTransformer};
