use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::AuthError, maintenance::MaintenanceError, repository::StorageError};

/// ApiError
///
/// Every failure a handler can return. The `Display` text of each variant is exactly
/// what the client sees; internal causes are logged where they occur and dropped here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Same message for an unknown email and a wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("{0}")]
    Validation(&'static str),
    #[error("Service temporarily unavailable")]
    StorageUnavailable,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => err.status(),
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::StorageUnavailable | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict => ApiError::EmailTaken,
            StorageError::Unavailable(detail) => {
                tracing::error!("storage error: {detail}");
                ApiError::StorageUnavailable
            }
        }
    }
}

impl From<MaintenanceError> for ApiError {
    fn from(err: MaintenanceError) -> Self {
        match err {
            MaintenanceError::Denied(auth) => ApiError::Auth(auth),
            MaintenanceError::Storage(storage) => storage.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
