use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response;

/// Shown whenever the inference endpoint cannot be reached at all.
pub const CANNOT_CONNECT_MESSAGE: &str =
    "Cannot connect to the API server. Make sure your server is running and the endpoint is correct.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", CANNOT_CONNECT_MESSAGE)]
    CannotConnect,

    #[error("{0}")]
    Api(String),

    #[error("{0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CannotConnect | AppError::Api(_) | AppError::Protocol(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::ConfigError(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error::<()>(self.status_code(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // A request that never produced a status line never reached the server.
        if err.is_builder() {
            AppError::Validation(format!("Invalid endpoint URL: {}", err))
        } else if err.status().is_none() && (err.is_connect() || err.is_request() || err.is_timeout()) {
            AppError::CannotConnect
        } else {
            AppError::Protocol(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("corrupt data file: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_connect_hides_transport_details() {
        assert_eq!(AppError::CannotConnect.to_string(), CANNOT_CONNECT_MESSAGE);
        assert_eq!(AppError::CannotConnect.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_and_not_found_are_distinct() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
