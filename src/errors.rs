use super::flash::{self, Flash, Level};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not logged in")]
    Unauthenticated,

    #[error("caller does not own this listing")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("upload rejected: {0}")]
    Upload(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // This enables using `?` on functions that return
    // `Result<_, anyhow::Error>` from inside handlers.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => flash::redirect(
                "/login",
                Some(Flash::new(Level::Warning, "Please log in first.")),
            ),
            Self::InvalidCredentials => flash::redirect(
                "/login",
                Some(Flash::new(Level::Danger, "Invalid email or password.")),
            ),
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            Self::NotFound => {
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            Self::Validation(msg) | Self::Upload(msg) => {
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => {
                tracing::error!(error = ?self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
                    .into_response()
            }
        }
    }
}
