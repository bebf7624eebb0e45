use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message used when an upstream failure carries no text of its own.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ServerMisconfigured(String),

    #[error("{0}")]
    UpstreamFailure(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// JSON body shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServerMisconfigured(_)
            | AppError::UpstreamFailure(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible message. Internal details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            AppError::UpstreamFailure(msg) if msg.trim().is_empty() => UNEXPECTED_ERROR.to_string(),
            AppError::ConfigError(_) => "Configuration error".to_string(),
            AppError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::ConfigError(err) | AppError::InternalError(err) = &self {
            tracing::error!(error = %err, "Request failed with internal error");
        }

        let mut res = (
            status,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response();

        if let AppError::MethodNotAllowed { allow } = self {
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }

        res
    }
}
