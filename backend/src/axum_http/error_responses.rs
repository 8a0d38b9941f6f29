use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Upstream service unavailable")]
    BadGateway,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Maps a use-case error onto the response it should produce.
    pub fn from_status<E>(status: StatusCode, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::BadRequest(err.to_string())
            }
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(err.to_string()),
            StatusCode::FORBIDDEN => AppError::Forbidden(err.to_string()),
            StatusCode::NOT_FOUND => AppError::NotFound(err.to_string()),
            StatusCode::CONFLICT => AppError::Conflict(err.to_string()),
            StatusCode::BAD_GATEWAY => {
                error!(error = ?err, "http: upstream provider failed");
                AppError::BadGateway
            }
            _ => AppError::Internal(anyhow::Error::new(err)),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(err) => {
                // Detail stays in the logs.
                error!(error = ?err, "http: internal error");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}
