mod me;
mod session;

use std::sync::Arc;

use axum::Router;

use mealhub_core::ContributionStats;

use crate::service::AuthService;

/// Shared state for the auth routes.
#[derive(Clone)]
pub struct AppState {
    pub svc: Arc<AuthService>,
    pub stats: Arc<dyn ContributionStats>,
}

/// Build the auth API router, mounted at `/auth`.
///
/// Authentication for the protected routes is enforced by the binary's
/// JWT middleware, which injects `Identity` into request extensions.
pub fn build_router(svc: Arc<AuthService>, stats: Arc<dyn ContributionStats>) -> Router {
    let state = AppState { svc, stats };

    let api = Router::new()
        .merge(session::routes())
        .merge(me::routes());

    Router::new().nest("/auth", api).with_state(state)
}
