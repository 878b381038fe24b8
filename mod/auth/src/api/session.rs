use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use mealhub_core::envelope;

use crate::api::AppState;
use crate::model::{LoginRequest, RegisterRequest};
use crate::service::AuthError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<Value>), AuthError> {
    let result = state.svc.register(input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        envelope::ok_with_message(result, "User registered successfully"),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<Value>, AuthError> {
    let result = state.svc.login(input)?;
    Ok(envelope::ok_with_message(result, "Login successful"))
}
