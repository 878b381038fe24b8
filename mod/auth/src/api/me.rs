use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};

use mealhub_core::{Identity, envelope};

use crate::api::AppState;
use crate::model::AddCaloriesRequest;
use crate::service::AuthError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/daily-calories", get(daily_calories))
        .route("/add-calories", post(add_calories))
        .route("/reset-calories", post(reset_calories))
}

async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AuthError> {
    let user = state.svc.get_user(&identity.user_id)?;

    let recipes = state
        .stats
        .recipe_count(&identity.user_id)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    let comments = state
        .stats
        .comment_count(&identity.user_id)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    let mut body = serde_json::to_value(&user).map_err(|e| AuthError::Internal(e.to_string()))?;
    body["_count"] = json!({ "recipes": recipes, "comments": comments });

    Ok(envelope::ok(body))
}

async fn daily_calories(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AuthError> {
    let calories = state.svc.daily_calories(&identity.user_id)?;
    Ok(envelope::ok(json!({ "dailyCalories": calories })))
}

async fn add_calories(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<AddCaloriesRequest>,
) -> Result<Json<Value>, AuthError> {
    let total = state.svc.add_calories(&identity.user_id, input.calories)?;
    Ok(envelope::ok_with_message(
        json!({ "dailyCalories": total, "addedCalories": input.calories }),
        "Calories added successfully",
    ))
}

async fn reset_calories(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AuthError> {
    state.svc.reset_calories(&identity.user_id)?;
    Ok(envelope::message("Daily calories reset successfully"))
}
