mod families;
mod invitations;
mod meal_votes;

use std::sync::Arc;

use axum::Router;

use crate::service::FamilyService;

/// Shared application state.
pub type AppState = Arc<FamilyService>;

/// Build the family API router, mounted at `/families`.
pub fn build_router(svc: Arc<FamilyService>) -> Router {
    let api = Router::new()
        .merge(families::routes())
        .merge(invitations::routes())
        .merge(meal_votes::routes());

    Router::new().nest("/families", api).with_state(svc)
}
