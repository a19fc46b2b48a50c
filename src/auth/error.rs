use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::repo::StoreError;

/// Every failure an auth handler can end with. Each variant knows its status
/// code, so a request always gets a terminating response.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The body could not be read as JSON. Keeps the status the extractor
    /// chose (400 syntax, 415 content type, 422 shape).
    #[error("{message}")]
    MalformedBody { status: StatusCode, message: String },
    #[error("All fields are required")]
    MissingFields,
    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Email already Exists")]
    EmailTaken,
    #[error("Invalid User data")]
    InvalidUserData,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Profile updates are not supported")]
    NotImplemented,
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("user store failure")]
    Store(#[source] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody { status, .. } => *status,
            Self::MissingFields
            | Self::WeakPassword { .. }
            | Self::InvalidEmail
            | Self::EmailTaken
            | Self::InvalidUserData => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Timeout(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::EmailTaken,
            StoreError::Rejected(_) => Self::InvalidUserData,
            StoreError::Backend(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = ?self, "request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
