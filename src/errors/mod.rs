//! Error handling module for the note pool backend.
//!
//! Every failure maps to a status code and a terse plain-text body. Store
//! details never reach the client; they are logged where they are converted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Body sent for every 5xx response.
pub const SERVER_ERROR_BODY: &str = "Server error";

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid required input
    Validation(String),
    /// Missing or incorrect admin secret
    Unauthorized,
    /// Mutation target absent
    NotFound(String),
    /// Store failure
    Database(String),
    /// Invalid startup configuration
    Config(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Unauthorized => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::Unauthorized => "Forbidden",
            AppError::NotFound(msg) => msg,
            AppError::Database(msg) => msg,
            AppError::Config(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("JSON error: {:?}", err);
        AppError::Validation(format!("Invalid JSON body: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => (status, msg).into_response(),
            AppError::Unauthorized => status.into_response(),
            AppError::Database(_) | AppError::Config(_) => {
                (status, SERVER_ERROR_BODY).into_response()
            }
        }
    }
}
