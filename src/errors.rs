use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{domain::envelope::ApiResponse, store::StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(&'static str),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("endpoint not found")]
    RouteNotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn validation(message: &'static str) -> Self {
        Self::Validation(message)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound(message)
    }

    /// Wraps a store failure. `context` is the only text the caller ever sees.
    pub fn storage(context: &'static str, source: StoreError) -> Self {
        Self::Storage { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(message) | Self::NotFound(message) => *message,
            Self::Storage { context, .. } => *context,
            Self::RouteNotFound => "Endpoint not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::PayloadTooLarge => "Request body too large",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Storage { context, source } = &self {
            tracing::error!(error = %source, context = %context, "request failed with storage error");
        }

        (self.status(), Json(ApiResponse::failure(self.public_message()))).into_response()
    }
}
