use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. The mobile client matches on
// these — never on the human-readable message string.

/// Stable error code constants.
///
/// Every error response carries `{"error": {"code": "...", "message": "..."}}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";

    // Domain codes used by the family and auth modules.
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const NOT_A_MEMBER: &str = "NOT_A_MEMBER";
    pub const NOT_ADMIN: &str = "NOT_ADMIN";
    pub const ALREADY_MEMBER: &str = "ALREADY_MEMBER";
    pub const ADMIN_CANNOT_LEAVE: &str = "ADMIN_CANNOT_LEAVE";
    pub const DUPLICATE_INVITATION: &str = "DUPLICATE_INVITATION";
    pub const VOTE_NOT_FOUND_OR_EXPIRED: &str = "VOTE_NOT_FOUND_OR_EXPIRED";
    pub const OPTION_NOT_FOUND: &str = "OPTION_NOT_FOUND";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Generic service error taxonomy shared across modules.
///
/// Business modules define their own error enums with domain-specific
/// codes; this type covers the cross-cutting cases (middleware, the
/// collaborator traits, storage plumbing). Each variant maps to a stable
/// error code (see [`error_code`]) and an HTTP status code.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing authentication credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials present but invalid or expired. HTTP 401.
    #[error("{0}")]
    TokenInvalid(String),

    /// Authenticated but not allowed. HTTP 403.
    #[error("{0}")]
    PermissionDenied(String),

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::INVALID_INPUT,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::TokenInvalid(_) => error_code::TOKEN_INVALID,
            ServiceError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
            ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = envelope::error_body(self.error_code(), &self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::TokenInvalid("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::PermissionDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(ServiceError::Conflict("x".into()).error_code(), "ALREADY_EXISTS");
        assert_eq!(ServiceError::Validation("x".into()).error_code(), "INVALID_INPUT");
        assert_eq!(ServiceError::Unauthorized("x".into()).error_code(), "UNAUTHENTICATED");
        assert_eq!(ServiceError::TokenInvalid("x".into()).error_code(), "TOKEN_INVALID");
        assert_eq!(ServiceError::PermissionDenied("x".into()).error_code(), "PERMISSION_DENIED");
        assert_eq!(ServiceError::Storage("x".into()).error_code(), "STORAGE_ERROR");
        assert_eq!(ServiceError::Internal("x".into()).error_code(), "INTERNAL");
    }

    #[test]
    fn error_display_is_just_message() {
        assert_eq!(ServiceError::NotFound("recipe 123".into()).to_string(), "recipe 123");
        assert_eq!(ServiceError::Conflict("dup key".into()).to_string(), "dup key");
        assert_eq!(ServiceError::Unauthorized("missing token".into()).to_string(), "missing token");
    }
}
