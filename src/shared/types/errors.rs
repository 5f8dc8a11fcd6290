use thiserror::Error;

use crate::domain::Violation;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<Violation>),

    #[error("{0}")]
    Conflict(String),

    #[error("Identifier mismatch: path id {path} does not match body id {body}")]
    IdentifierMismatch { path: i32, body: i32 },

    #[error("Concurrent modification of {entity} {id}")]
    ConcurrencyConflict { entity: &'static str, id: i32 },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn user_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "User",
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether the error is the caller's fault (reported as a 4xx).
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::ConcurrencyConflict { .. } | Self::Storage(_)
        )
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
