//! Error envelope shared by every endpoint
//!
//! Successful responses carry the resource itself. Failures carry
//! `{"error": "...", "violations": [...]}`, where `violations` is present
//! only when field validation failed.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{DomainError, Violation};

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolationDto {
    /// Offending field, e.g. `phoneNumber`
    pub field: String,
    /// Rule that failed: `notEmpty`, `maxLength`, `email`, `minimumAge` or `phoneFormat`
    pub rule: String,
    /// Human-readable reason
    pub message: String,
}

impl From<Violation> for ViolationDto {
    fn from(v: Violation) -> Self {
        Self {
            field: v.field.to_string(),
            rule: v.rule.as_str().to_string(),
            message: v.message,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Description of the failure
    pub error: String,
    /// Field violations, present only for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationDto>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            violations: Vec::new(),
        }
    }
}

/// Rejection returned by handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain failure onto its HTTP status and body.
pub fn domain_error_response(e: DomainError) -> ApiError {
    let status = match &e {
        DomainError::Validation(_)
        | DomainError::Conflict(_)
        | DomainError::IdentifierMismatch { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::ConcurrencyConflict { .. } | DomainError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if !e.is_client_error() {
        error!(error = %e, "Request failed");
    }

    let body = match e {
        DomainError::Validation(violations) => ErrorResponse {
            error: "Validation failed".to_string(),
            violations: violations.into_iter().map(ViolationDto::from).collect(),
        },
        DomainError::Conflict(message) => ErrorResponse::new(message),
        other => ErrorResponse::new(other.to_string()),
    };

    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{validate_user, UserDraft};
    use chrono::NaiveDate;

    #[test]
    fn validation_maps_to_400_with_violations() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let violations = validate_user(&UserDraft::default(), today);
        let count = violations.len();

        let (status, Json(body)) = domain_error_response(DomainError::Validation(violations));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.violations.len(), count);
        assert_eq!(body.violations[0].field, "firstName");
        assert_eq!(body.violations[0].rule, "notEmpty");
    }

    #[test]
    fn conflict_keeps_plain_message() {
        let (status, Json(body)) =
            domain_error_response(DomainError::Conflict("Email must be unique.".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Email must be unique.");
        assert!(body.violations.is_empty());
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::user_not_found(1), StatusCode::NOT_FOUND),
            (
                DomainError::IdentifierMismatch { path: 5, body: 6 },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::ConcurrencyConflict { entity: "User", id: 1 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Storage("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(domain_error_response(err).0, expected);
        }
    }
}
