use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;

// Type alias for Result with our ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailTaken,

    #[error("Not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal,
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ApiError::NotFound,
            RepositoryError::AlreadyExists => ApiError::EmailTaken,
            RepositoryError::Database(e) => ApiError::Database(e),
            RepositoryError::Malformed(_) => ApiError::Internal,
        }
    }
}

impl From<crate::services::user_service::UserServiceError> for ApiError {
    fn from(err: crate::services::user_service::UserServiceError) -> Self {
        use crate::services::user_service::UserServiceError as E;
        match err {
            E::EmailTaken => ApiError::EmailTaken,
            E::InvalidCredentials => ApiError::InvalidCredentials,
            E::UserNotFound => ApiError::NotFound,
            E::InvalidEmail | E::WeakPassword | E::InvalidDob => {
                ApiError::Validation(err.to_string())
            }
            E::MissingField(_) => ApiError::Validation(err.to_string()),
            E::HashingError(_) => ApiError::Internal,
            E::RepositoryError(e) => e.into(),
        }
    }
}

impl From<crate::services::rating_service::RatingServiceError> for ApiError {
    fn from(err: crate::services::rating_service::RatingServiceError) -> Self {
        use crate::services::rating_service::RatingServiceError as E;
        match err {
            E::InvalidDate(_) | E::InvalidScore | E::InvalidMonth(_) => {
                ApiError::Validation(err.to_string())
            }
            E::RepositoryError(e) => e.into(),
        }
    }
}

impl From<crate::services::settings_service::SettingsServiceError> for ApiError {
    fn from(err: crate::services::settings_service::SettingsServiceError) -> Self {
        use crate::services::settings_service::SettingsServiceError as E;
        match err {
            E::Validation(msg) => ApiError::Validation(msg),
            E::RepositoryError(e) => e.into(),
        }
    }
}

impl From<crate::services::admin_service::AdminServiceError> for ApiError {
    fn from(err: crate::services::admin_service::AdminServiceError) -> Self {
        use crate::services::admin_service::AdminServiceError as E;
        match err {
            E::Validation(msg) => ApiError::Validation(msg),
            E::RepositoryError(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotLoggedIn => (StatusCode::FORBIDDEN, "Not logged in".to_string()),
            ApiError::NotAuthorized => (StatusCode::FORBIDDEN, "Not authorized".to_string()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::EmailTaken => (StatusCode::CONFLICT, "Email already in use".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Database(_) | ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
