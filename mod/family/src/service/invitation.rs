//! Invitation state machine: pending → accepted | rejected.

use mealhub_core::{Identity, new_id, now_rfc3339};
use mealhub_sql::{Row, Statement, Value};

use crate::model::{
    FamilyInvitation, FamilyMember, InvitationAction, InvitationStatus, InviteMemberRequest,
    MemberRole,
};
use crate::service::{FamilyError, FamilyService};

impl FamilyService {
    /// Invite a user into a family by email or username. Admin only.
    pub fn send_invitation(
        &self,
        family_id: &str,
        inviter: &Identity,
        input: InviteMemberRequest,
    ) -> Result<FamilyInvitation, FamilyError> {
        if input.email.is_none() && input.username.is_none() {
            return Err(FamilyError::Validation("Email or username is required".into()));
        }

        self.require_admin(family_id, &inviter.user_id, "Only family admin can send invitations")?;

        let family = self.load_family(family_id)?;

        let target = self
            .directory
            .resolve(input.email.as_deref(), input.username.as_deref())
            .map_err(|e| FamilyError::Storage(e.to_string()))?
            .ok_or(FamilyError::UserNotFound)?;

        if self.is_member(family_id, &target.id)? {
            return Err(FamilyError::AlreadyMember);
        }

        // At most one pending invitation per (family, target). Checked
        // here rather than by a DB constraint: resolved invitations for
        // the same target must not block a re-invite.
        let pending = self
            .sql
            .query(
                "SELECT 1 as present FROM family_invitations \
                 WHERE family_id = ?1 AND status = 'pending' \
                 AND (invited_email = ?2 OR invited_username = ?3)",
                &[
                    Value::Text(family_id.to_string()),
                    Value::Text(target.email.clone()),
                    Value::Text(target.username.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;
        if !pending.is_empty() {
            return Err(FamilyError::DuplicateInvitation);
        }

        let now = now_rfc3339();
        let invitation = FamilyInvitation {
            id: new_id(),
            family_id: family_id.to_string(),
            family_name: family.name,
            inviter_user_id: inviter.user_id.clone(),
            inviter_username: inviter.username.clone(),
            invited_email: target.email,
            invited_username: target.username,
            status: InvitationStatus::Pending,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let data = serde_json::to_string(&invitation)
            .map_err(|e| FamilyError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO family_invitations \
                 (id, family_id, inviter_user_id, invited_email, invited_username, status, data, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                &[
                    Value::Text(invitation.id.clone()),
                    Value::Text(invitation.family_id.clone()),
                    Value::Text(invitation.inviter_user_id.clone()),
                    Value::Text(invitation.invited_email.clone()),
                    Value::Text(invitation.invited_username.clone()),
                    Value::Text(invitation.status.as_str().to_string()),
                    Value::Text(data),
                    Value::Text(now.clone()),
                    Value::Text(now),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        tracing::info!(
            invitation_id = %invitation.id,
            family_id = %family_id,
            invited = %invitation.invited_username,
            "sent invitation"
        );
        Ok(invitation)
    }

    /// Pending invitations addressed to the caller's current email or
    /// username, newest first.
    pub fn pending_invitations(
        &self,
        identity: &Identity,
    ) -> Result<Vec<FamilyInvitation>, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM family_invitations \
                 WHERE status = 'pending' AND (invited_email = ?1 OR invited_username = ?2) \
                 ORDER BY created_at DESC",
                &[
                    Value::Text(identity.email.clone()),
                    Value::Text(identity.username.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        rows.iter().map(row_to_invitation).collect()
    }

    /// Accept or reject a pending invitation addressed to the caller.
    ///
    /// Accepting creates the membership and flips the status in a single
    /// transaction, so an invitation can never end up `accepted` without
    /// a matching member row. The one exception is the race guard: if
    /// the caller already joined through another path, the invitation is
    /// still marked accepted (clearing it from the pending list) but no
    /// duplicate membership is created, and the "already a member"
    /// outcome is reported.
    pub fn process_invitation(
        &self,
        invitation_id: &str,
        responder: &Identity,
        action: InvitationAction,
    ) -> Result<(FamilyInvitation, Option<FamilyMember>), FamilyError> {
        // Resolution is by the responder's current email/username, not a
        // stored user id.
        let rows = self
            .sql
            .query(
                "SELECT data FROM family_invitations \
                 WHERE id = ?1 AND status = 'pending' \
                 AND (invited_email = ?2 OR invited_username = ?3)",
                &[
                    Value::Text(invitation_id.to_string()),
                    Value::Text(responder.email.clone()),
                    Value::Text(responder.username.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        let mut invitation = rows
            .first()
            .map(row_to_invitation)
            .transpose()?
            .ok_or_else(|| {
                FamilyError::NotFound("Invitation not found or already processed".into())
            })?;

        let now = now_rfc3339();

        if action == InvitationAction::Reject {
            invitation.status = InvitationStatus::Rejected;
            invitation.updated_at = now;
            self.persist_invitation(&invitation)?;
            return Ok((invitation, None));
        }

        // Race guard: already joined through another path.
        if self.is_member(&invitation.family_id, &responder.user_id)? {
            invitation.status = InvitationStatus::Accepted;
            invitation.updated_at = now;
            self.persist_invitation(&invitation)?;
            return Err(FamilyError::AlreadyMember);
        }

        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = now.clone();
        let data = serde_json::to_string(&invitation)
            .map_err(|e| FamilyError::Internal(e.to_string()))?;

        let member = FamilyMember {
            family_id: invitation.family_id.clone(),
            user_id: responder.user_id.clone(),
            username: responder.username.clone(),
            role: MemberRole::Member,
            joined_at: now.clone(),
        };

        // Both writes commit or neither does.
        self.sql
            .exec_transaction(&[
                Statement::new(
                    "INSERT INTO family_members (family_id, user_id, username, role, joined_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    vec![
                        Value::Text(member.family_id.clone()),
                        Value::Text(member.user_id.clone()),
                        Value::Text(member.username.clone()),
                        Value::Text(member.role.as_str().to_string()),
                        Value::Text(member.joined_at.clone()),
                    ],
                ),
                Statement::new(
                    "UPDATE family_invitations SET status = ?1, data = ?2, updated_at = ?3 \
                     WHERE id = ?4",
                    vec![
                        Value::Text(invitation.status.as_str().to_string()),
                        Value::Text(data),
                        Value::Text(now),
                        Value::Text(invitation.id.clone()),
                    ],
                ),
            ])
            .map_err(|e| {
                if e.is_unique_violation() {
                    FamilyError::AlreadyMember
                } else {
                    FamilyError::Storage(e.to_string())
                }
            })?;

        tracing::info!(
            invitation_id = %invitation.id,
            family_id = %invitation.family_id,
            user_id = %responder.user_id,
            "accepted invitation"
        );
        Ok((invitation, Some(member)))
    }

    fn persist_invitation(&self, invitation: &FamilyInvitation) -> Result<(), FamilyError> {
        let data = serde_json::to_string(invitation)
            .map_err(|e| FamilyError::Internal(e.to_string()))?;

        let affected = self
            .sql
            .exec(
                "UPDATE family_invitations SET status = ?1, data = ?2, updated_at = ?3 WHERE id = ?4",
                &[
                    Value::Text(invitation.status.as_str().to_string()),
                    Value::Text(data),
                    Value::Text(invitation.updated_at.clone()),
                    Value::Text(invitation.id.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(FamilyError::NotFound("Invitation not found".into()));
        }
        Ok(())
    }
}

/// Deserialize a FamilyInvitation from a row's `data` JSON column.
fn row_to_invitation(row: &Row) -> Result<FamilyInvitation, FamilyError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| FamilyError::Internal("missing data column".into()))?;
    serde_json::from_str(json)
        .map_err(|e| FamilyError::Internal(format!("bad invitation json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateFamilyRequest;
    use crate::service::test_support::test_service;

    fn setup() -> (
        std::sync::Arc<FamilyService>,
        std::sync::Arc<crate::service::test_support::FakeDirectory>,
        Identity,
        Identity,
        String,
    ) {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");
        let bob = dir.add("bob");
        let family = svc
            .create_family(
                &alice,
                CreateFamilyRequest {
                    name: "Smiths".into(),
                    dietary_restrictions: vec![],
                },
            )
            .unwrap();
        let family_id = family.family.id;
        (svc, dir, alice, bob, family_id)
    }

    fn invite_by_username(username: &str) -> InviteMemberRequest {
        InviteMemberRequest {
            email: None,
            username: Some(username.into()),
        }
    }

    #[test]
    fn send_requires_admin() {
        let (svc, _, _, bob, family_id) = setup();
        let result = svc.send_invitation(&family_id, &bob, invite_by_username("carol"));
        assert!(matches!(result, Err(FamilyError::NotAdmin(_))));
    }

    #[test]
    fn send_requires_target() {
        let (svc, _, alice, _, family_id) = setup();

        assert!(matches!(
            svc.send_invitation(&family_id, &alice, InviteMemberRequest::default()),
            Err(FamilyError::Validation(_))
        ));

        assert!(matches!(
            svc.send_invitation(&family_id, &alice, invite_by_username("ghost")),
            Err(FamilyError::UserNotFound)
        ));
    }

    #[test]
    fn cannot_invite_existing_member() {
        let (svc, _, alice, _, family_id) = setup();
        let result = svc.send_invitation(&family_id, &alice, invite_by_username("alice"));
        assert!(matches!(result, Err(FamilyError::AlreadyMember)));
    }

    #[test]
    fn duplicate_pending_invitation_rejected() {
        let (svc, _, alice, _, family_id) = setup();

        svc.send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();

        // Same target by username or by email: one pending at a time.
        assert!(matches!(
            svc.send_invitation(&family_id, &alice, invite_by_username("bob")),
            Err(FamilyError::DuplicateInvitation)
        ));
        assert!(matches!(
            svc.send_invitation(
                &family_id,
                &alice,
                InviteMemberRequest {
                    email: Some("bob@example.com".into()),
                    username: None,
                },
            ),
            Err(FamilyError::DuplicateInvitation)
        ));
    }

    #[test]
    fn pending_list_addresses_target() {
        let (svc, _, alice, bob, family_id) = setup();
        svc.send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();

        let pending = svc.pending_invitations(&bob).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].family_name, "Smiths");
        assert_eq!(pending[0].inviter_username, "alice");

        assert!(svc.pending_invitations(&alice).unwrap().is_empty());
    }

    #[test]
    fn accept_creates_member_and_flips_status() {
        let (svc, _, alice, bob, family_id) = setup();
        let invitation = svc
            .send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();

        let (updated, member) = svc
            .process_invitation(&invitation.id, &bob, InvitationAction::Accept)
            .unwrap();
        assert_eq!(updated.status, InvitationStatus::Accepted);
        let member = member.unwrap();
        assert_eq!(member.role, MemberRole::Member);

        assert!(svc.is_member(&family_id, &bob.user_id).unwrap());
        assert!(svc.pending_invitations(&bob).unwrap().is_empty());
    }

    #[test]
    fn reject_is_terminal() {
        let (svc, _, alice, bob, family_id) = setup();
        let invitation = svc
            .send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();

        let (updated, member) = svc
            .process_invitation(&invitation.id, &bob, InvitationAction::Reject)
            .unwrap();
        assert_eq!(updated.status, InvitationStatus::Rejected);
        assert!(member.is_none());
        assert!(!svc.is_member(&family_id, &bob.user_id).unwrap());

        // A processed invitation is gone from the pending lookup.
        let again = svc.process_invitation(&invitation.id, &bob, InvitationAction::Accept);
        assert!(matches!(again, Err(FamilyError::NotFound(_))));
    }

    #[test]
    fn accept_race_guard_keeps_single_membership() {
        let (svc, _, alice, bob, family_id) = setup();
        let invitation = svc
            .send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();

        // Bob joins through another path before accepting.
        svc.insert_member(&family_id, &bob, MemberRole::Member, &now_rfc3339())
            .unwrap();

        let result = svc.process_invitation(&invitation.id, &bob, InvitationAction::Accept);
        assert!(matches!(result, Err(FamilyError::AlreadyMember)));

        // The invitation is cleared from the pending list anyway...
        assert!(svc.pending_invitations(&bob).unwrap().is_empty());

        // ...and exactly one membership row exists.
        let rows = svc
            .sql
            .query(
                "SELECT COUNT(*) as cnt FROM family_members WHERE family_id = ?1 AND user_id = ?2",
                &[
                    Value::Text(family_id.clone()),
                    Value::Text(bob.user_id.clone()),
                ],
            )
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(1));
    }

    #[test]
    fn invitation_not_addressed_to_caller_is_invisible() {
        let (svc, dir, alice, _, family_id) = setup();
        let carol = dir.add("carol");
        let invitation = svc
            .send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();

        let result = svc.process_invitation(&invitation.id, &carol, InvitationAction::Accept);
        assert!(matches!(result, Err(FamilyError::NotFound(_))));
    }

    #[test]
    fn resolved_invitation_allows_reinvite() {
        let (svc, _, alice, bob, family_id) = setup();
        let invitation = svc
            .send_invitation(&family_id, &alice, invite_by_username("bob"))
            .unwrap();
        svc.process_invitation(&invitation.id, &bob, InvitationAction::Reject)
            .unwrap();

        // The rejection freed the (family, target) slot.
        assert!(
            svc.send_invitation(&family_id, &alice, invite_by_username("bob"))
                .is_ok()
        );
    }
}
