use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{models::ScoreType, storage::StorageError},
    domain::ScoreError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No game is registered under this name.
    #[error("unknown game `{0}`")]
    UnknownGame(String),
    /// The game has no category with this name.
    #[error("unknown category `{category}` in game `{game}`")]
    UnknownCategory { game: String, category: String },
    /// No channel is registered under this name.
    #[error("unknown channel `{0}`")]
    UnknownChannel(String),
    /// The score variant differs from the category's declared type.
    #[error("cannot record a {actual:?} score in a {expected:?} category")]
    TypeMismatch {
        expected: ScoreType,
        actual: ScoreType,
    },
    /// The raw value could not be parsed as the category's score type.
    #[error("`{raw}` is not a valid {expected:?} score")]
    InvalidFormat { raw: String, expected: ScoreType },
    #[error("unsupported score type `{0}`")]
    UnsupportedScoreType(String),
    /// The category groups other categories and holds no scores.
    #[error("category `{0}` has subcategories and cannot hold scores")]
    NotLeaf(String),
    /// Storage backend failure.
    #[error("storage unavailable")]
    Persistence(#[source] StorageError),
    /// The game is not enabled in the channel the request came from.
    #[error("game `{game}` is not available in channel `{channel}`")]
    GameNotInChannel { game: String, channel: String },
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Persistence(err)
    }
}

impl From<ScoreError> for ServiceError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::InvalidFormat { raw, expected } => {
                ServiceError::InvalidFormat { raw, expected }
            }
            ScoreError::TypeMismatch { expected, actual } => {
                ServiceError::TypeMismatch { expected, actual }
            }
            ScoreError::NotLeaf { category } => ServiceError::NotLeaf(category),
            ScoreError::UnsupportedScoreType(name) => ServiceError::UnsupportedScoreType(name),
            ScoreError::InvalidPattern(pattern) => {
                ServiceError::InvalidInput(format!("invalid time pattern `{pattern}`"))
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with the stored category layout.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The score could not be interpreted.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::UnknownGame(_)
            | ServiceError::UnknownCategory { .. }
            | ServiceError::UnknownChannel(_)
            | ServiceError::GameNotInChannel { .. } => AppError::NotFound(message),
            ServiceError::InvalidFormat { .. } => AppError::Unprocessable(message),
            ServiceError::TypeMismatch { .. } | ServiceError::NotLeaf(_) => {
                AppError::Conflict(message)
            }
            ServiceError::UnsupportedScoreType(_) => AppError::Internal(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Persistence(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
