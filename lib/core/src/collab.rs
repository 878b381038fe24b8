//! Collaborator traits between business modules.
//!
//! Modules never depend on each other directly. Each trait here is
//! implemented by the module that owns the data and injected at startup
//! by the binary, so the family module can resolve invitation targets
//! and embed recipe summaries without knowing about the auth or recipe
//! modules.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Verified identity attached to a request by the authentication layer.
///
/// The JWT middleware validates the bearer token and stores this in
/// request extensions. Handlers extract it with `Extension<Identity>`
/// (or `Option<Extension<Identity>>` on optionally-authenticated routes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub username: String,
}

/// Minimal public view of a user, as returned by [`UserDirectory`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// Lookup of users by email or username.
///
/// Used by the family module to resolve invitation targets. Email takes
/// precedence when both are given.
pub trait UserDirectory: Send + Sync {
    fn resolve(
        &self,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<UserRef>, ServiceError>;
}

/// Sink for calorie credits earned by cooking and eating meals.
pub trait CalorieLedger: Send + Sync {
    /// Add calories to the user's daily total, returning the new total.
    fn add_calories(&self, user_id: &str, calories: i64) -> Result<i64, ServiceError>;
}

/// Per-user contribution counts shown on the profile screen.
pub trait ContributionStats: Send + Sync {
    fn recipe_count(&self, user_id: &str) -> Result<i64, ServiceError>;
    fn comment_count(&self, user_id: &str) -> Result<i64, ServiceError>;
}

/// Compact recipe view embedded in meal-vote options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub prep_time: i64,
    pub cook_time: i64,
    pub images: Vec<String>,
}

/// Lookup of recipe summaries by id.
///
/// Returns `Ok(None)` when the recipe no longer exists; callers render a
/// null recipe rather than failing the whole read.
pub trait RecipeCatalog: Send + Sync {
    fn summarize(&self, recipe_id: &str) -> Result<Option<RecipeSummary>, ServiceError>;
}
