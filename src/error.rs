//! Typed errors for event operations and their mapping onto HTTP responses.
//!
//! Every error reaches the client as the same envelope:
//! `{"error": {"code": ..., "message": ..., "details": ...}}` where `code`
//! is a stable snake_case identifier.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

/// A single field failure inside a request validation error.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event with ID '{0}' not found")]
    NotFound(String),

    /// Data-level failures surfaced by the database (constraints, I/O).
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BusinessRule(String),

    /// Malformed request input; carries per-field details.
    #[error("Request validation failed")]
    RequestValidation(Vec<FieldError>),

    #[error("An internal server error occurred")]
    Internal(#[source] anyhow::Error),
}

impl EventError {
    /// Map a database failure to the operation-specific validation error.
    /// Constraint violations and plain database errors get distinct messages;
    /// the underlying error is logged, never exposed.
    pub fn from_database(operation: &str, err: sqlx::Error) -> Self {
        tracing::error!("Database error during event {}: {:?}", operation, err);
        let constraint_violation = matches!(
            &err,
            sqlx::Error::Database(db_err) if matches!(
                db_err.kind(),
                sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation
            )
        );
        if constraint_violation {
            EventError::Validation(format!(
                "Event {} failed due to data validation constraints",
                operation
            ))
        } else {
            EventError::Validation(format!("Event {} failed due to database error", operation))
        }
    }

    /// snake_case code used in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            EventError::NotFound(_) => "event_not_found",
            EventError::Validation(_) => "event_validation",
            EventError::BusinessRule(_) => "event_business_rule",
            EventError::RequestValidation(_) => "validation_error",
            EventError::Internal(_) => "internal_server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EventError::NotFound(_) => StatusCode::NOT_FOUND,
            EventError::Validation(_)
            | EventError::BusinessRule(_)
            | EventError::RequestValidation(_) => StatusCode::BAD_REQUEST,
            EventError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            EventError::RequestValidation(errors) => {
                serde_json::to_string(&serde_json::json!({ "validation_errors": errors })).ok()
            }
            _ => None,
        }
    }
}

impl From<anyhow::Error> for EventError {
    fn from(err: anyhow::Error) -> Self {
        EventError::Internal(err)
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        if let EventError::Internal(err) = &self {
            tracing::error!("Unhandled error: {:?}", err);
        }
        let body = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "details": self.details(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(EventError::NotFound("x".to_string()).code(), "event_not_found");
        assert_eq!(EventError::Validation("v".to_string()).code(), "event_validation");
        assert_eq!(EventError::BusinessRule("b".to_string()).code(), "event_business_rule");
        assert_eq!(EventError::RequestValidation(Vec::new()).code(), "validation_error");
        assert_eq!(
            EventError::Internal(anyhow::anyhow!("boom")).code(),
            "internal_server_error"
        );
    }

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(
            EventError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            EventError::BusinessRule("b".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EventError::RequestValidation(Vec::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EventError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_id() {
        let err = EventError::NotFound("abc-123".to_string());
        assert_eq!(err.to_string(), "Event with ID 'abc-123' not found");
    }

    #[test]
    fn request_validation_details_list_every_field() {
        let err = EventError::RequestValidation(vec![
            FieldError::new("title", "Title must be between 1 and 255 characters"),
            FieldError::new("start_datetime", "Timezone-naive datetime not allowed"),
        ]);
        let details = err.details().expect("details should be present");
        let parsed: serde_json::Value = serde_json::from_str(&details).expect("details is JSON");
        let entries = parsed["validation_errors"]
            .as_array()
            .expect("validation_errors is an array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["field"], "title");
        assert_eq!(entries[1]["field"], "start_datetime");
    }

    #[test]
    fn non_validation_errors_have_no_details() {
        assert!(EventError::NotFound("x".to_string()).details().is_none());
        assert!(EventError::BusinessRule("b".to_string()).details().is_none());
    }
}
