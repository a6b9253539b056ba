use amora_shared::errors::{AppError, ErrorCode};

/// Failure modes of the document store.
///
/// The variants double as the classification vocabulary for swallowed
/// read-path failures: discovery logs `class = err.class()` instead of
/// propagating.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("missing index for query: {0}")]
    MissingIndex(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Stable label used in classified logs.
    pub fn class(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "permission_denied",
            Self::MissingIndex(_) => "missing_index",
            Self::Unavailable(_) => "unavailable",
            Self::NotFound { .. } => "not_found",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::new(ErrorCode::NotFound, err.to_string()),
            StoreError::PermissionDenied(_) => {
                AppError::new(ErrorCode::Forbidden, err.to_string())
            }
            StoreError::Unavailable(_) | StoreError::MissingIndex(_) => {
                AppError::new(ErrorCode::ServiceUnavailable, err.to_string())
            }
            StoreError::Serialization(_) => {
                AppError::new(ErrorCode::InternalError, err.to_string())
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_stable() {
        assert_eq!(StoreError::PermissionDenied("x".into()).class(), "permission_denied");
        assert_eq!(StoreError::MissingIndex("x".into()).class(), "missing_index");
        assert_eq!(StoreError::Unavailable("x".into()).class(), "unavailable");
        assert_eq!(StoreError::not_found("profiles", "a").class(), "not_found");
    }

    #[test]
    fn not_found_maps_to_not_found_code() {
        let app: AppError = StoreError::not_found("profiles", "a").into();
        assert_eq!(app.error_code(), "E0003");
    }
}
