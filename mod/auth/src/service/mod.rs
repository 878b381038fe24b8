pub mod collab;
pub mod schema;
pub mod token;
pub mod user;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use mealhub_core::error::error_code;
use mealhub_core::{ServiceError, envelope};
use mealhub_sql::SQLStore;

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user with this email or username already exists")]
    AlreadyExists,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid or expired token: {0}")]
    TokenInvalid(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AlreadyExists => error_code::ALREADY_EXISTS,
            AuthError::InvalidCredentials => error_code::INVALID_CREDENTIALS,
            AuthError::UserNotFound => error_code::USER_NOT_FOUND,
            AuthError::TokenInvalid(_) => error_code::TOKEN_INVALID,
            AuthError::Validation(_) => error_code::INVALID_INPUT,
            AuthError::Storage(_) => error_code::STORAGE_ERROR,
            AuthError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AlreadyExists => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = envelope::error_body(self.error_code(), &self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::AlreadyExists => ServiceError::Conflict(e.to_string()),
            AuthError::InvalidCredentials => ServiceError::Unauthorized(e.to_string()),
            AuthError::UserNotFound => ServiceError::NotFound(e.to_string()),
            AuthError::TokenInvalid(m) => ServiceError::TokenInvalid(m),
            AuthError::Validation(m) => ServiceError::Validation(m),
            AuthError::Storage(m) => ServiceError::Storage(m),
            AuthError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 7 days, matching the mobile
    /// client's session expectations).
    pub token_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "mealhub-dev-secret-change-me".to_string(),
            token_ttl: 604_800, // 7 days
        }
    }
}

/// The Auth service. Holds the SQL store and configuration.
pub struct AuthService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }
}
