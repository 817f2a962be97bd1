//! Error types for letterbox

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Letterbox error types
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Letter not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Front-matter error: {0}")]
    FrontMatter(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ArchiveError {
    /// Whether this error means the requested letter does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArchiveError::NotFound(_))
    }
}

/// Result type for letterbox operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

impl IntoResponse for ArchiveError {
    fn into_response(self) -> Response {
        match self {
            ArchiveError::NotFound(slug) => {
                tracing::debug!("No letter for slug {:?}", slug);
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            other => {
                tracing::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = ArchiveError::NotFound("does-not-exist".to_string());
        assert_eq!(err.to_string(), "Letter not found: does-not-exist");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_display_transform() {
        let err = ArchiveError::Transform("bad input".to_string());
        assert_eq!(err.to_string(), "Transform error: bad input");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = ArchiveError::NotFound("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let err = ArchiveError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
