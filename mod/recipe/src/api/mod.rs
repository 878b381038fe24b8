mod engagement;
mod progress;
mod recipes;

use std::sync::Arc;

use axum::Router;

use crate::service::RecipeService;

/// Shared application state.
pub type AppState = Arc<RecipeService>;

/// Build the recipe API router, mounted at `/recipes`.
pub fn build_router(svc: Arc<RecipeService>) -> Router {
    let api = Router::new()
        .merge(recipes::routes())
        .merge(engagement::routes())
        .merge(progress::routes());

    Router::new().nest("/recipes", api).with_state(svc)
}
