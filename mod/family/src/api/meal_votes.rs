use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::Value;

use mealhub_core::{Identity, envelope};

use crate::api::AppState;
use crate::model::{CreateMealVoteRequest, SubmitVoteRequest};
use crate::service::FamilyError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/meal-vote", post(create_meal_vote))
        .route("/{id}/meal-votes", get(list_meal_votes))
        .route("/{id}/meal-votes/{voteId}/vote", post(submit_vote))
        .route("/{id}/meal-votes/{voteId}/end", post(end_meal_vote))
}

async fn create_meal_vote(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<CreateMealVoteRequest>,
) -> Result<(axum::http::StatusCode, Json<Value>), FamilyError> {
    let vote = svc.create_meal_vote(&id, &identity, input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        envelope::ok_with_message(vote, "Meal vote created successfully"),
    ))
}

async fn list_meal_votes(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, FamilyError> {
    let votes = svc.list_meal_votes(&id, &identity.user_id)?;
    Ok(envelope::ok(votes))
}

async fn submit_vote(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, vote_id)): Path<(String, String)>,
    Json(input): Json<SubmitVoteRequest>,
) -> Result<Json<Value>, FamilyError> {
    let ballot = svc.submit_vote(&id, &vote_id, &identity, input)?;
    Ok(envelope::ok_with_message(ballot, "Vote submitted successfully"))
}

async fn end_meal_vote(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((id, vote_id)): Path<(String, String)>,
) -> Result<Json<Value>, FamilyError> {
    let vote = svc.end_meal_vote(&id, &vote_id, &identity.user_id)?;
    Ok(envelope::ok_with_message(vote, "Meal vote ended"))
}
