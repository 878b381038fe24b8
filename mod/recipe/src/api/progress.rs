use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde_json::Value;

use mealhub_core::{Identity, envelope};

use crate::api::AppState;
use crate::model::{AteMealRequest, CompleteCookingRequest};
use crate::service::RecipeError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/start-cooking", post(start_cooking))
        .route("/{id}/complete-cooking", post(complete_cooking))
        .route("/{id}/ate-meal", post(ate_meal))
}

async fn start_cooking(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RecipeError> {
    let progress = svc.start_cooking(&identity.user_id, &id)?;
    Ok(envelope::ok_with_message(progress, "Cooking started successfully"))
}

async fn complete_cooking(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<CompleteCookingRequest>,
) -> Result<Json<Value>, RecipeError> {
    let progress = svc.complete_cooking(&identity.user_id, &id, input)?;
    Ok(envelope::ok_with_message(progress, "Cooking completed successfully"))
}

async fn ate_meal(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<AteMealRequest>,
) -> Result<Json<Value>, RecipeError> {
    let progress = svc.ate_meal(&identity.user_id, &id, input)?;
    Ok(envelope::ok_with_message(
        progress,
        "Meal consumption recorded successfully",
    ))
}
