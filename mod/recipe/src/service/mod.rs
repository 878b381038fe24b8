pub mod collab;
pub mod crud;
pub mod engagement;
pub mod progress;
pub mod schema;
pub mod trending;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use mealhub_core::error::error_code;
use mealhub_core::{CalorieLedger, ServiceError, UserDirectory, envelope};
use mealhub_sql::{Row, SQLStore};

use crate::model::Recipe;

/// Recipe service error type.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl RecipeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RecipeError::NotFound(_) => error_code::NOT_FOUND,
            RecipeError::Validation(_) => error_code::INVALID_INPUT,
            RecipeError::Storage(_) => error_code::STORAGE_ERROR,
            RecipeError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RecipeError::NotFound(_) => StatusCode::NOT_FOUND,
            RecipeError::Validation(_) => StatusCode::BAD_REQUEST,
            RecipeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RecipeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = envelope::error_body(self.error_code(), &self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

impl From<RecipeError> for ServiceError {
    fn from(e: RecipeError) -> Self {
        match e {
            RecipeError::NotFound(m) => ServiceError::NotFound(m),
            RecipeError::Validation(m) => ServiceError::Validation(m),
            RecipeError::Storage(m) => ServiceError::Storage(m),
            RecipeError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// The Recipe service.
///
/// `directory` resolves author profile images for write-time snapshots;
/// `ledger` credits calories when a cooked meal is eaten.
pub struct RecipeService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) ledger: Arc<dyn CalorieLedger>,
}

impl RecipeService {
    /// Create a new RecipeService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        directory: Arc<dyn UserDirectory>,
        ledger: Arc<dyn CalorieLedger>,
    ) -> Result<Arc<Self>, RecipeError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            sql,
            directory,
            ledger,
        }))
    }
}

/// Deserialize a Recipe from a row's `data` JSON column.
pub(crate) fn row_to_recipe(row: &Row) -> Result<Recipe, RecipeError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| RecipeError::Internal("missing data column".into()))?;
    serde_json::from_str(json).map_err(|e| RecipeError::Internal(format!("bad recipe json: {e}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use mealhub_core::{CalorieLedger, ServiceError, UserDirectory, UserRef};
    use mealhub_sql::SqliteStore;

    use super::RecipeService;
    use crate::model::{CreateRecipeRequest, Difficulty, Ingredient, Instruction};

    /// Directory stub: resolves any username to a fixed profile image.
    pub struct StubDirectory;

    impl UserDirectory for StubDirectory {
        fn resolve(
            &self,
            email: Option<&str>,
            username: Option<&str>,
        ) -> Result<Option<UserRef>, ServiceError> {
            let username = match (email, username) {
                (_, Some(u)) => u.to_string(),
                (Some(e), None) => e.split('@').next().unwrap_or("user").to_string(),
                (None, None) => return Ok(None),
            };
            Ok(Some(UserRef {
                id: format!("id-{username}"),
                email: format!("{username}@example.com"),
                username,
                profile_image: None,
            }))
        }
    }

    /// Ledger stub recording every credit.
    #[derive(Default)]
    pub struct RecordingLedger {
        pub credits: std::sync::Mutex<Vec<(String, i64)>>,
    }

    impl CalorieLedger for RecordingLedger {
        fn add_calories(&self, user_id: &str, calories: i64) -> Result<i64, ServiceError> {
            let mut credits = self.credits.lock().unwrap();
            credits.push((user_id.to_string(), calories));
            let total = credits
                .iter()
                .filter(|(u, _)| u == user_id)
                .map(|(_, c)| c)
                .sum();
            Ok(total)
        }
    }

    pub fn test_service() -> (Arc<RecipeService>, Arc<RecordingLedger>) {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let ledger = Arc::new(RecordingLedger::default());
        let svc = RecipeService::new(sql, Arc::new(StubDirectory), ledger.clone()).unwrap();
        (svc, ledger)
    }

    pub fn create_req(title: &str) -> CreateRecipeRequest {
        CreateRecipeRequest {
            title: title.into(),
            description: format!("how to make {title}"),
            difficulty: Difficulty::Easy,
            prep_time: 10,
            cook_time: 20,
            servings: 2,
            cuisine_type: "turkish".into(),
            categories: vec!["dinner".into()],
            calories_per_serving: Some(400),
            nutrition_info: None,
            ingredients: vec![Ingredient {
                name: "onion".into(),
                amount: "1".into(),
                unit: "piece".into(),
            }],
            instructions: vec![Instruction {
                step: 1,
                description: "chop the onion".into(),
                duration: Some(2),
            }],
            images: vec![],
        }
    }
}
