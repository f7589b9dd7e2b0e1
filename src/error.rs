// src/error.rs - single error path for every feed operation
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::repositories::StoreError;
use crate::services::image_storage::StorageError;
use crate::services::notifier::NotifierError;

pub type FeedResult<T> = Result<T, FeedError>;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Validation failed, entered data is incorrect")]
    ValidationFailed(Vec<FieldError>),
    #[error("{0}")]
    UnprocessableInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Not authorized")]
    Forbidden,
    #[error("Not authenticated: {0}")]
    Unauthorized(String),
    #[error("notifier used before initialization")]
    UninitializedState,
    #[error("infrastructure failure: {0}")]
    Infrastructure(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a [FieldError]>,
}

impl ResponseError for FeedError {
    fn status_code(&self) -> StatusCode {
        match self {
            FeedError::ValidationFailed(_) | FeedError::UnprocessableInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FeedError::NotFound(_) => StatusCode::NOT_FOUND,
            FeedError::Forbidden => StatusCode::FORBIDDEN,
            FeedError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            FeedError::UninitializedState | FeedError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        } else {
            log::debug!("request rejected ({}): {}", status.as_u16(), self);
        }

        // internal details stay in the log
        let message = match self {
            FeedError::UninitializedState | FeedError::Infrastructure(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let data = match self {
            FeedError::ValidationFailed(errors) => Some(errors.as_slice()),
            _ => None,
        };

        HttpResponse::build(status).json(ErrorBody { message, data })
    }
}

impl From<StoreError> for FeedError {
    fn from(err: StoreError) -> Self {
        FeedError::Infrastructure(err.to_string())
    }
}

impl From<StorageError> for FeedError {
    fn from(err: StorageError) -> Self {
        FeedError::Infrastructure(err.to_string())
    }
}

impl From<NotifierError> for FeedError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::Uninitialized => FeedError::UninitializedState,
            other => FeedError::Infrastructure(other.to_string()),
        }
    }
}

impl From<actix_multipart::MultipartError> for FeedError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        FeedError::UnprocessableInput(format!("Malformed upload: {}", err))
    }
}
