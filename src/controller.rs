//! Page controller - resolves a slug into a render model

use std::sync::Arc;

use crate::content::{
    is_valid_slug, sort_newest_first, ContentStore, ContentTransformer, LetterSummary,
    RenderModel,
};
use crate::error::{ArchiveError, Result};

/// Looks a letter up and hands it to the transformer
///
/// Cheap to clone; the store and transformer are shared.
#[derive(Clone)]
pub struct LetterController {
    store: Arc<dyn ContentStore>,
    transformer: Arc<dyn ContentTransformer>,
}

impl LetterController {
    pub fn new<S, T>(store: S, transformer: T) -> Self
    where
        S: ContentStore + 'static,
        T: ContentTransformer + 'static,
    {
        Self {
            store: Arc::new(store),
            transformer: Arc::new(transformer),
        }
    }

    /// Resolve a slug into a render model
    ///
    /// Fails with [`ArchiveError::NotFound`] when the store has no such
    /// letter. Store and transformer errors are returned unchanged.
    pub fn resolve(&self, slug: &str) -> Result<RenderModel> {
        if !is_valid_slug(slug) {
            return Err(ArchiveError::NotFound(slug.to_string()));
        }

        let letter = self
            .store
            .get_by_slug(slug)?
            .ok_or_else(|| ArchiveError::NotFound(slug.to_string()))?;

        tracing::debug!("Resolved {:?} to {:?}", slug, letter.subject);
        self.transformer.to_render_model(&letter)
    }

    /// All letters, newest first
    pub fn summaries(&self) -> Result<Vec<LetterSummary>> {
        let mut summaries: Vec<LetterSummary> = self
            .store
            .list()?
            .iter()
            .map(LetterSummary::from)
            .collect();
        sort_newest_first(&mut summaries);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Letter, MarkdownTransformer, MemoryStore};
    use chrono::NaiveDate;

    struct FailingTransformer;

    impl ContentTransformer for FailingTransformer {
        fn to_render_model(&self, _letter: &Letter) -> Result<RenderModel> {
            Err(ArchiveError::Transform("malformed body".to_string()))
        }
    }

    fn spring() -> Letter {
        Letter::new(
            "2023-01-spring-update",
            "Spring Update",
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            "<p>Hello</p>",
        )
    }

    fn controller() -> LetterController {
        let store: MemoryStore = vec![
            spring(),
            Letter::new(
                "2022-11-autumn",
                "Autumn",
                NaiveDate::from_ymd_opt(2022, 11, 2).unwrap(),
                "Leaves.",
            ),
        ]
        .into_iter()
        .collect();
        LetterController::new(store, MarkdownTransformer::default())
    }

    #[test]
    fn test_resolve_known_slug() {
        let model = controller().resolve("2023-01-spring-update").unwrap();
        assert_eq!(model.subject, "Spring Update");
        assert_eq!(
            model.publish_date,
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );
        assert_eq!(model.body_html, "<p>Hello</p>");
    }

    #[test]
    fn test_resolve_unknown_slug() {
        let err = controller().resolve("does-not-exist").unwrap_err();
        assert!(matches!(err, ArchiveError::NotFound(ref s) if s == "does-not-exist"));
    }

    #[test]
    fn test_resolve_rejects_unusable_slugs() {
        let controller = controller();
        for slug in ["", "../etc/passwd", "a/b"] {
            assert!(controller.resolve(slug).unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let controller = controller();
        let first = controller.resolve("2023-01-spring-update").unwrap();
        let second = controller.resolve("2023-01-spring-update").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transformer_failure_propagates() {
        let store: MemoryStore = vec![spring()].into_iter().collect();
        let controller = LetterController::new(store, FailingTransformer);

        let err = controller.resolve("2023-01-spring-update").unwrap_err();
        assert!(matches!(err, ArchiveError::Transform(_)));

        // Absence still wins over the transformer
        assert!(controller.resolve("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_summaries_newest_first() {
        let summaries = controller().summaries().unwrap();
        let slugs: Vec<_> = summaries.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["2023-01-spring-update", "2022-11-autumn"]);
    }
}
