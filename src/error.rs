use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::session::{SessionAction, SessionStatus};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("Invalid FIT: {0}")]
    InvalidFit(String),
    #[error("No timestamped track points found in file")]
    EmptyFile,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Cannot {action} a session that is {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: SessionAction,
    },
    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidPoint { latitude: f64, longitude: f64 },
    #[error("Point at {got} is older than the last recorded point at {last}")]
    OutOfOrder { last: String, got: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Activity not found: {0}")]
    ActivityNotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Parse(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Session(SessionError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            AppError::Session(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SessionNotFound(_) | AppError::ActivityNotFound(_) => StatusCode::NOT_FOUND,
        };

        tracing::debug!("Request failed with {}: {}", status, self);

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
