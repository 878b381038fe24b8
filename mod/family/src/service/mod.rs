pub mod family;
pub mod invitation;
pub mod meal_vote;
pub mod schema;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use mealhub_core::error::error_code;
use mealhub_core::{RecipeCatalog, UserDirectory, envelope};
use mealhub_sql::SQLStore;

/// Family service error type.
///
/// The domain variants carry the stable codes the mobile client matches
/// on; messages mirror what the client already displays.
#[derive(Debug, Error)]
pub enum FamilyError {
    #[error("You are not a member of this family")]
    NotAMember,

    #[error("{0}")]
    NotAdmin(String),

    #[error("Admin cannot leave family. Delete the family instead.")]
    AdminCannotLeave,

    #[error("User is already a family member")]
    AlreadyMember,

    #[error("Invitation already sent to this user")]
    DuplicateInvitation,

    #[error("User not found")]
    UserNotFound,

    #[error("Vote not found or expired")]
    VoteNotFoundOrExpired,

    #[error("Vote option not found")]
    OptionNotFound,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl FamilyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FamilyError::NotAMember => error_code::NOT_A_MEMBER,
            FamilyError::NotAdmin(_) => error_code::NOT_ADMIN,
            FamilyError::AdminCannotLeave => error_code::ADMIN_CANNOT_LEAVE,
            FamilyError::AlreadyMember => error_code::ALREADY_MEMBER,
            FamilyError::DuplicateInvitation => error_code::DUPLICATE_INVITATION,
            FamilyError::UserNotFound => error_code::USER_NOT_FOUND,
            FamilyError::VoteNotFoundOrExpired => error_code::VOTE_NOT_FOUND_OR_EXPIRED,
            FamilyError::OptionNotFound => error_code::OPTION_NOT_FOUND,
            FamilyError::NotFound(_) => error_code::NOT_FOUND,
            FamilyError::Validation(_) => error_code::INVALID_INPUT,
            FamilyError::Storage(_) => error_code::STORAGE_ERROR,
            FamilyError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FamilyError::NotAMember => StatusCode::FORBIDDEN,
            FamilyError::NotAdmin(_) => StatusCode::FORBIDDEN,
            FamilyError::AdminCannotLeave => StatusCode::BAD_REQUEST,
            FamilyError::AlreadyMember => StatusCode::CONFLICT,
            FamilyError::DuplicateInvitation => StatusCode::CONFLICT,
            FamilyError::UserNotFound => StatusCode::NOT_FOUND,
            FamilyError::VoteNotFoundOrExpired => StatusCode::NOT_FOUND,
            FamilyError::OptionNotFound => StatusCode::NOT_FOUND,
            FamilyError::NotFound(_) => StatusCode::NOT_FOUND,
            FamilyError::Validation(_) => StatusCode::BAD_REQUEST,
            FamilyError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FamilyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FamilyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = envelope::error_body(self.error_code(), &self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

/// Configuration for the family service.
#[derive(Debug, Clone)]
pub struct FamilyConfig {
    /// Whether a meal vote may list the same recipe twice. The original
    /// client never deduplicated, so the permissive default matches its
    /// observable behavior; set false to reject duplicates up front.
    pub allow_duplicate_options: bool,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_options: true,
        }
    }
}

/// The Family service.
pub struct FamilyService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) catalog: Arc<dyn RecipeCatalog>,
    pub(crate) config: FamilyConfig,
}

impl FamilyService {
    /// Create a new FamilyService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        directory: Arc<dyn UserDirectory>,
        catalog: Arc<dyn RecipeCatalog>,
        config: FamilyConfig,
    ) -> Result<Arc<Self>, FamilyError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            sql,
            directory,
            catalog,
            config,
        }))
    }
}
