use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Extension, Json, Router};
use serde_json::Value;

use mealhub_core::{Identity, envelope};

use crate::api::AppState;
use crate::model::CreateFamilyRequest;
use crate::service::FamilyError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_family))
        .route("/my-families", get(my_families))
        .route("/{id}", get(get_family).delete(delete_family))
        .route("/{id}/leave", delete(leave_family))
}

async fn create_family(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateFamilyRequest>,
) -> Result<(axum::http::StatusCode, Json<Value>), FamilyError> {
    let family = svc.create_family(&identity, input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        envelope::ok_with_message(family, "Family created successfully"),
    ))
}

async fn my_families(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, FamilyError> {
    let families = svc.my_families(&identity.user_id)?;
    Ok(envelope::ok(families))
}

async fn get_family(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, FamilyError> {
    let family = svc.get_family(&id, &identity.user_id)?;
    Ok(envelope::ok(family))
}

async fn delete_family(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, FamilyError> {
    svc.delete_family(&id, &identity.user_id)?;
    Ok(envelope::message("Family deleted successfully"))
}

async fn leave_family(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Value>, FamilyError> {
    svc.leave_family(&id, &identity.user_id)?;
    Ok(envelope::message("Successfully left the family"))
}
