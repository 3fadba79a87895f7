use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use unimart_catalog::CatalogError;
use unimart_core::repository::RepoError;
use unimart_core::MediaError;
use unimart_moderation::ModerationError;
use unimart_promo::PromoError;
use unimart_review::ReviewError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),

    #[error("{0}")]
    AuthorizationError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    ConflictError(String),

    #[error("{0}")]
    UpstreamError(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => AppError::ValidationError(msg),
            CatalogError::Unauthorized(msg) => AppError::AuthorizationError(msg),
            CatalogError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
        }
    }
}

impl From<ModerationError> for AppError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::Validation(msg) => AppError::ValidationError(msg),
            ModerationError::Unauthorized(msg) => AppError::AuthorizationError(msg),
            ModerationError::NotFound(msg) => AppError::NotFoundError(msg),
            ModerationError::Catalog(inner) => inner.into(),
        }
    }
}

impl From<PromoError> for AppError {
    fn from(err: PromoError) -> Self {
        match err {
            PromoError::Validation(msg) => AppError::ValidationError(msg),
            PromoError::Unauthorized(msg) => AppError::AuthorizationError(msg),
            PromoError::NotFound(msg) => AppError::NotFoundError(msg),
            PromoError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Validation(msg) => AppError::ValidationError(msg),
            ReviewError::Unauthorized(msg) => AppError::AuthorizationError(msg),
            ReviewError::DuplicateReview { .. } => AppError::ConflictError(err.to_string()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::UpstreamError(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
