//! Gateway error types with HTTP status code mapping.
//!
//! [`ReconError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Validation failures carry the full list of [`FieldError`]s so clients
//! can render per-field messages instead of a single opaque string.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single failed field check from an ingestion validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending payload field (e.g. `"amount"`).
    pub field: String,
    /// Human-readable reason the field was rejected.
    pub message: String,
}

impl FieldError {
    /// Creates a new `FieldError` for the given field.
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// The kind of record an operation referred to.
///
/// Used by [`ReconError::NotFound`] and the generic record store so that
/// a missing webreport and a missing transaction produce distinct messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Customer-submitted transfer claim.
    Webreport,
    /// Bank-sourced record of money movement.
    BankStatement,
    /// Candidate pairing produced by the matching engine.
    MatchingResult,
    /// Balance-affecting settled record.
    Transaction,
    /// Customer balance account.
    Customer,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Webreport => "webreport",
            Self::BankStatement => "bank statement",
            Self::MatchingResult => "matching result",
            Self::Transaction => "transaction",
            Self::Customer => "customer",
        };
        write!(f, "{name}")
    }
}

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: amount: must be greater than 0",
///     "details": [{"field": "amount", "message": "must be greater than 0"}]
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (field errors for validation failures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category           | HTTP Status                  |
/// |-----------|--------------------|------------------------------|
/// | 1000–1999 | Validation         | 400 Bad Request              |
/// | 2000–2999 | Not Found / State  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server             | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// One or more payload fields failed validation.
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Operation referenced a record that does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of the missing record.
        kind: EntityKind,
        /// The id that was looked up.
        id: String,
    },

    /// Attempted transition from a terminal or already-claimed state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReconError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::NotFound { .. } => 2001,
            Self::Conflict(_) => 2002,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convenience constructor for a [`ReconError::NotFound`].
    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl IntoResponse for ReconError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Joins field errors into a single `field: message` list for display.
fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ReconError::Validation(vec![FieldError::new("amount", "must be greater than 0")]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ReconError::not_found(EntityKind::MatchingResult, "abc");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "matching result not found: abc");
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = ReconError::Conflict("already verified".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2002);
    }

    #[test]
    fn persistence_maps_to_500() {
        let err = ReconError::Persistence("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_details_serialize_field_list() {
        let err = ReconError::Validation(vec![
            FieldError::new("virtual_account_number", "is required"),
            FieldError::new("amount", "must be greater than 0"),
        ]);
        let ReconError::Validation(errors) = &err else {
            panic!("expected validation variant");
        };
        let json = serde_json::to_value(errors).unwrap_or_default();
        let Some(arr) = json.as_array() else {
            panic!("expected array");
        };
        assert_eq!(arr.len(), 2);
    }
}
