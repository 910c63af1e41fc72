use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::BookingStatus;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("booking service unreachable: {0}")]
    Transport(String),

    #[error("booking service returned {status}")]
    Upstream { status: u16 },

    #[error("malformed response from booking service: {0}")]
    MalformedResponse(String),

    /// A failed console operation, carrying the message shown to the operator.
    #[error("{message}")]
    Operation {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("confirmation required: {0}")]
    ConfirmationRequired(&'static str),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    pub fn operation(message: &'static str, source: AppError) -> Self {
        AppError::Operation {
            message,
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::MalformedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            AppError::Upstream {
                status: status.as_u16(),
            }
        } else {
            AppError::Transport(e.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Upstream { status } if *status == 404 => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Operation { .. } => StatusCode::BAD_GATEWAY,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = match &self {
            AppError::ConfirmationRequired(prompt) => serde_json::json!({
                "error": "confirmation required",
                "prompt": prompt,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
