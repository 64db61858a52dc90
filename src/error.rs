use crate::services::user_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const USER_NOT_FOUND: &str = "userId not found";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("There was a duplicate key error")]
    DuplicateKey,
    #[error("{0}")]
    NotFound(String),
    #[error("not found")]
    RouteNotFound,
    #[error("entry {position} has no date")]
    MissingEntryDate { position: usize },
    #[error("{0}")]
    Internal(String),
    #[error("Store error: {0}")]
    Store(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse classification of an [`AppError`], attached to error responses as an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DuplicateKey,
    NotFound,
    RouteNotFound,
    Internal,
}

impl ErrorKind {
    /// Kinds the original service answered with `200` and a text body.
    #[must_use]
    pub const fn answered_ok_in_legacy_mode(self) -> bool {
        matches!(self, Self::Validation | Self::DuplicateKey | Self::NotFound)
    }
}

impl AppError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateKey => ErrorKind::DuplicateKey,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RouteNotFound => ErrorKind::RouteNotFound,
            Self::MissingEntryDate { .. } | Self::Internal(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::DuplicateKey => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound | ErrorKind::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey => Self::DuplicateKey,
            StoreError::NotFound(_) => Self::NotFound(USER_NOT_FOUND.to_string()),
            err @ StoreError::MissingField { .. } => Self::Validation(err.to_string()),
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match &self {
            Self::Store(e) => {
                tracing::error!(error = %e, "Store failure");
                "Internal Server Error".to_string()
            }
            Self::MissingEntryDate { .. } | Self::Internal(_) => {
                tracing::error!(error = %self, "Internal server error occurred");
                self.to_string()
            }
            Self::RouteNotFound => self.to_string(),
            Self::Validation(_) | Self::DuplicateKey | Self::NotFound(_) => {
                tracing::debug!(message = %self, "Request rejected");
                self.to_string()
            }
        };

        let mut response = (status, message).into_response();
        response.extensions_mut().insert(kind);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_store_errors_map_to_tagged_kinds() {
        assert_eq!(AppError::from(StoreError::DuplicateKey).kind(), ErrorKind::DuplicateKey);
        assert_eq!(AppError::from(StoreError::NotFound("x".into())).to_string(), USER_NOT_FOUND);
        assert_eq!(
            AppError::from(StoreError::MissingField { path: "description" }).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            AppError::from(StoreError::MissingField { path: "duration" }).to_string(),
            "Path `duration` is required."
        );
        assert_eq!(AppError::from(StoreError::Conflict("x".into())).kind(), ErrorKind::Internal);
        assert_eq!(AppError::from(StoreError::IdExhausted).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_legacy_mode_only_covers_caller_errors() {
        assert!(ErrorKind::Validation.answered_ok_in_legacy_mode());
        assert!(ErrorKind::DuplicateKey.answered_ok_in_legacy_mode());
        assert!(ErrorKind::NotFound.answered_ok_in_legacy_mode());
        assert!(!ErrorKind::RouteNotFound.answered_ok_in_legacy_mode());
        assert!(!ErrorKind::Internal.answered_ok_in_legacy_mode());
    }

    #[tokio::test]
    async fn test_response_is_plain_text_with_kind_extension() {
        let response = AppError::Validation("Please insert a username".into()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.extensions().get::<ErrorKind>(), Some(&ErrorKind::Validation));
        assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
        assert_eq!(body_text(response).await, "Please insert a username");
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let response = AppError::from(StoreError::IdExhausted).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }
}
