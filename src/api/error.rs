//! Unified API error handling.
//!
//! Every JSON endpoint reports failures in the same envelope:
//! `{"error": {"code": "...", "message": "...", "details": {...}}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

/// Field name -> messages. Fields are unordered; messages keep the order they were added.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Machine-readable `code` of the envelope; serialized in snake_case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    ValidationError,
    DatabaseError,
}

impl ErrorCode {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    /// Field -> messages, only for `validation_error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// No identity on the request
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// 400 carrying every field error; the message is the first error when
    /// only one field failed
    pub fn validation(errors: FieldErrors) -> Self {
        let message = match errors.len() {
            1 => errors
                .values()
                .flat_map(|messages| messages.first())
                .next()
                .cloned()
                .unwrap_or_else(|| "Validation failed".to_string()),
            n => format!("Validation failed for {} fields", n),
        };

        Self {
            details: Some(errors),
            ..Self::new(ErrorCode::ValidationError, message)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                warn!("Duplicate row rejected: {}", db_err);
                ApiError::new(ErrorCode::Conflict, "That entry already exists")
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                warn!("Dangling reference rejected: {}", db_err);
                ApiError::bad_request("Referenced workout or exercise does not exist")
            }
            _ => {
                error!("Database error: {}", err);
                ApiError::new(ErrorCode::DatabaseError, "A database error occurred")
            }
        }
    }
}

/// Collects field errors while a form is checked
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    errors: FieldErrors,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a single-field check, if it failed
    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.add(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_not_found_is_a_server_error() {
        // Repository lookups use fetch_optional; a RowNotFound here is a bug
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_single_field() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("name", "Workout name is required");
        let err = ApiError::validation(builder.into_errors());
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.message, "Workout name is required");
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("name", "Workout name is required");
        builder.add("started_at", "Invalid date");
        builder.add("name", "Workout name is too long (max 255 characters)");

        let errors = builder.into_errors();
        assert_eq!(errors["name"].len(), 2);
        assert_eq!(errors["started_at"], vec!["Invalid date"]);

        let err = ApiError::validation(errors);
        assert!(err.message.contains("2 fields"));
    }

    #[test]
    fn test_builder_finish() {
        let builder = ValidationErrorBuilder::new();
        assert_eq!(builder.finish(|| 7), Ok(7));

        let mut builder = ValidationErrorBuilder::new();
        builder.check("reps", Err("Reps must be at least 1".to_string()));
        builder.check("weight", Ok(()));
        let errors = builder.finish(|| 7).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("reps"));
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let mut builder = ValidationErrorBuilder::new();
        builder.add("name", "Workout name is required");
        let response = ApiError::validation(builder.into_errors()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(json["error"]["details"]["name"][0], "Workout name is required");

        let response = ApiError::not_found("Workout not found").into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].get("details").is_none());
    }
}
