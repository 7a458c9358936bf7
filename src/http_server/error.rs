//! Defines the custom `ApiError` type for the HTTP server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::Envelope;
use crate::router::RouterError;

/// An error that can be converted into an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be decoded.
    BadRequest(String),

    /// The requested room does not exist.
    NotFound(String),

    /// A generic internal server error.
    InternalServerError(String),
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::UnknownRoom { .. } => ApiError::NotFound(err.to_string()),
            RouterError::Provider { .. } => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::InternalServerError(err) => {
                tracing::error!("Internal server error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error.".to_string())
            }
        };

        let body: Envelope<()> = Envelope { status: "error", message: Some(message), data: None };
        (status, Json(body)).into_response()
    }
}
