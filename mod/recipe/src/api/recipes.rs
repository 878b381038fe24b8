use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{Value, json};

use mealhub_core::{Identity, ListParams, envelope};

use crate::api::AppState;
use crate::model::{CreateRecipeRequest, RandomQuery, RecipeListQuery, UpdateRecipeRequest};
use crate::service::RecipeError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/trending", get(trending_recipes))
        .route("/random", get(random_recipes))
        .route("/user/me", get(my_recipes))
        .route(
            "/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

async fn list_recipes(
    State(svc): State<AppState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Value>, RecipeError> {
    let result = svc.list_recipes(&query)?;
    Ok(envelope::ok(json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn trending_recipes(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, RecipeError> {
    let recipes = svc.trending_recipes(&params)?;
    Ok(envelope::ok(recipes))
}

async fn random_recipes(
    State(svc): State<AppState>,
    Query(query): Query<RandomQuery>,
) -> Result<Json<Value>, RecipeError> {
    let recipes = svc.random_recipes(&query)?;
    Ok(envelope::ok_with_message(
        recipes,
        "Random recipes retrieved successfully",
    ))
}

async fn my_recipes(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, RecipeError> {
    let result = svc.user_recipes(&identity.user_id, &params)?;
    Ok(envelope::ok(json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_recipe(
    State(svc): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RecipeError> {
    let recipe = svc.get_recipe(&id)?;
    let comments = svc.list_comments(&id, &ListParams { limit: 10, offset: 0 })?;

    let mut body =
        serde_json::to_value(&recipe).map_err(|e| RecipeError::Internal(e.to_string()))?;
    body["comments"] = serde_json::to_value(&comments.items)
        .map_err(|e| RecipeError::Internal(e.to_string()))?;

    if let Some(Extension(identity)) = identity {
        body["isLiked"] = json!(svc.is_liked(&identity.user_id, &id)?);
    }

    Ok(envelope::ok(body))
}

async fn create_recipe(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateRecipeRequest>,
) -> Result<(axum::http::StatusCode, Json<Value>), RecipeError> {
    let recipe = svc.create_recipe(&identity, input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        envelope::ok_with_message(recipe, "Recipe created successfully"),
    ))
}

async fn update_recipe(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRecipeRequest>,
) -> Result<Json<Value>, RecipeError> {
    let recipe = svc.update_recipe(&id, &identity.user_id, input)?;
    Ok(envelope::ok_with_message(recipe, "Recipe updated successfully"))
}

async fn delete_recipe(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RecipeError> {
    svc.delete_recipe(&id, &identity.user_id)?;
    Ok(envelope::message("Recipe deleted successfully"))
}
