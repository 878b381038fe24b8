//! Route registration — collects all module routes + system endpoints.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::auth_middleware::{self, JwtState};

/// Build the complete router with all routes.
///
/// Module routes are already `Router<()>` nested under their own
/// prefixes (they called `.with_state()` internally); the JWT middleware
/// wraps everything, letting public and optional-auth paths through by
/// path rules.
pub fn build_router(jwt_state: Arc<JwtState>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        tracing::info!(module = name, "mounting module routes");
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(
        jwt_state,
        auth_middleware::auth_middleware,
    ))
}

async fn index() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "mealhub",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health - Health check",
            "POST /auth/register - User registration",
            "POST /auth/login - User login",
            "GET /recipes - Browse recipes",
            "GET /recipes/trending - Trending recipes",
            "GET /families/my-families - Your families",
        ],
    }))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "mealhubd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
