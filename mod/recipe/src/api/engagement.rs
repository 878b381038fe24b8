use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};

use mealhub_core::{Identity, ListParams, envelope};

use crate::api::AppState;
use crate::model::CreateCommentRequest;
use crate::service::RecipeError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/like", post(toggle_like))
        .route("/{id}/view", post(record_view))
        .route("/{id}/comments", get(list_comments).post(add_comment))
}

async fn toggle_like(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RecipeError> {
    let outcome = svc.toggle_like(&identity.user_id, &id)?;
    let message = if outcome.liked {
        "Recipe liked"
    } else {
        "Recipe unliked"
    };
    Ok(envelope::ok_with_message(outcome, message))
}

async fn record_view(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, RecipeError> {
    svc.record_view(&identity.user_id, &id)?;
    Ok(envelope::message("View recorded"))
}

async fn list_comments(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, RecipeError> {
    let result = svc.list_comments(&id, &params)?;
    Ok(envelope::ok(json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn add_comment(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<CreateCommentRequest>,
) -> Result<(axum::http::StatusCode, Json<Value>), RecipeError> {
    let comment = svc.add_comment(&identity, &id, input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        envelope::ok_with_message(comment, "Comment added successfully"),
    ))
}
