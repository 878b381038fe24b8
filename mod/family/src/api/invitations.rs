use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};

use mealhub_core::{Identity, envelope};

use crate::api::AppState;
use crate::model::{InvitationAction, InviteMemberRequest, ProcessInvitationRequest};
use crate::service::FamilyError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/invitations", post(send_invitation))
        .route("/invitations/pending", get(pending_invitations))
        .route("/invitations/{invitationId}", patch(process_invitation))
}

async fn send_invitation(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<InviteMemberRequest>,
) -> Result<(axum::http::StatusCode, Json<Value>), FamilyError> {
    let invitation = svc.send_invitation(&id, &identity, input)?;
    Ok((
        axum::http::StatusCode::CREATED,
        envelope::ok_with_message(invitation, "Invitation sent successfully"),
    ))
}

async fn pending_invitations(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, FamilyError> {
    let invitations = svc.pending_invitations(&identity)?;
    Ok(envelope::ok(invitations))
}

async fn process_invitation(
    State(svc): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(invitation_id): Path<String>,
    Json(input): Json<ProcessInvitationRequest>,
) -> Result<Json<Value>, FamilyError> {
    let (invitation, member) = svc.process_invitation(&invitation_id, &identity, input.action)?;

    let (body, message) = match input.action {
        InvitationAction::Accept => (
            json!({ "invitation": invitation, "member": member }),
            "Invitation accepted successfully",
        ),
        InvitationAction::Reject => (
            serde_json::to_value(&invitation)
                .map_err(|e| FamilyError::Internal(e.to_string()))?,
            "Invitation rejected",
        ),
    };

    Ok(envelope::ok_with_message(body, message))
}
