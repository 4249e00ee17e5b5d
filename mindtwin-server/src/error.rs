// MindTwin Server - Error types
// Copyright (c) 2025 MindTwin contributors
//
// Licensed under AGPL-3.0.
// See LICENSE file for details.

//! Store and API errors.
//!
//! Every [`ApiError`] renders as the JSON envelope
//! `{"success": false, "error": <kind>, "message": <text>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ValidationError;

/// Result type for document store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A report with this hash already exists
    #[error("report with hash {0} already exists")]
    DuplicateReport(String),

    /// The store cannot serve requests
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Store(StoreError::DuplicateReport(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the envelope's `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "Bad Request",
            ApiError::Validation(_) => "Validation Error",
            ApiError::NotFound(_) => "Not Found",
            ApiError::Conflict(_) | ApiError::Store(StoreError::DuplicateReport(_)) => "Conflict",
            ApiError::Store(StoreError::Unavailable(_)) => "Service Unavailable",
            ApiError::Internal(_) => "Internal Server Error",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(field) => ApiError::MissingField(field),
            ValidationError::Invalid(message) => ApiError::Validation(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            match &self {
                ApiError::Store(StoreError::Unavailable(_)) => "Document store unavailable",
                _ => "Something went wrong",
            }
            .to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::MissingField("patientId").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::DuplicateReport("abc".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Unavailable("down".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err: ApiError = ValidationError::MissingField("rawText").into();
        assert_eq!(err.kind(), "Bad Request");
        assert_eq!(err.to_string(), "Missing required field: rawText");

        let err: ApiError = ValidationError::Invalid("bad window".into()).into();
        assert_eq!(err.kind(), "Validation Error");
    }

    #[test]
    fn test_server_error_hides_cause() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
