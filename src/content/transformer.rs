//! Content transformers - turn a stored letter into something renderable

use super::{Letter, MarkdownRenderer, RenderModel};
use crate::config::MarkdownConfig;
use crate::error::Result;

/// Produces the render-ready form of a letter
///
/// Implementations own sanitization: whatever lands in
/// [`RenderModel::body_html`] is inserted into the page without escaping.
pub trait ContentTransformer: Send + Sync {
    fn to_render_model(&self, letter: &Letter) -> Result<RenderModel>;
}

/// Renders letter bodies as markdown
pub struct MarkdownTransformer {
    renderer: MarkdownRenderer,
}

impl MarkdownTransformer {
    pub fn new(config: &MarkdownConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::with_options(config),
        }
    }
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

impl ContentTransformer for MarkdownTransformer {
    fn to_render_model(&self, letter: &Letter) -> Result<RenderModel> {
        let body_html = self.renderer.render(&letter.body)?;

        Ok(RenderModel {
            slug: letter.slug.clone(),
            subject: letter.subject.clone(),
            publish_date: letter.publish_date,
            body_html,
        })
    }
}
