use serde::{Deserialize, Serialize};

use mealhub_core::RecipeSummary;

// ---------------------------------------------------------------------------
// Family & membership
// ---------------------------------------------------------------------------

/// A family group. The admin is fixed at creation and cannot change;
/// deleting the family is the only way out for the admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub name: String,
    pub admin_user_id: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Membership role inside a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

/// A membership row, unique per (family, user). The username is
/// snapshotted at join time for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub family_id: String,
    pub user_id: String,
    pub username: String,
    pub role: MemberRole,
    pub joined_at: String,
}

/// Body for `POST /families`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    pub name: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

/// A family with its members, as returned by the read endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyView {
    #[serde(flatten)]
    pub family: Family,
    pub members: Vec<FamilyMember>,
    /// Active meal votes with tallies. Empty on endpoints that don't
    /// embed votes.
    pub meal_votes: Vec<MealVoteView>,
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// Invitation lifecycle.
///
/// ```text
/// PENDING → ACCEPTED
///         → REJECTED
/// ```
///
/// Both outcomes are terminal; re-inviting requires the pending
/// invitation to be resolved first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// An invitation into a family.
///
/// The target is identified by email and username captured at send time,
/// not by user id; the responder is matched against their current email
/// or username when the invitation is processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInvitation {
    pub id: String,
    pub family_id: String,
    /// Family name snapshot for the pending-invitations list.
    pub family_name: String,
    pub inviter_user_id: String,
    pub inviter_username: String,
    pub invited_email: String,
    pub invited_username: String,
    pub status: InvitationStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for `POST /families/{id}/invitations`. At least one of the two
/// fields must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InviteMemberRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Accept or reject, from the invitation PATCH body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationAction {
    Accept,
    Reject,
}

/// Body for `PATCH /families/invitations/{invitationId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessInvitationRequest {
    pub action: InvitationAction,
}

// ---------------------------------------------------------------------------
// Meal votes
// ---------------------------------------------------------------------------

/// A family meal poll.
///
/// ```text
/// active  (is_active, now < ends_at)
/// expired (is_active, now ≥ ends_at — implicit, never written back)
/// ended   (is_active = false, set by an admin action; terminal)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealVote {
    pub id: String,
    pub family_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 expiry, fixed at creation time + 24h.
    pub ends_at: String,
    pub is_active: bool,
    pub created_at: String,
}

/// One selectable recipe in a meal vote. Carries no winner flag; the
/// tally is derived from the ballots on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealVoteOption {
    pub id: String,
    pub vote_id: String,
    pub recipe_id: String,
    pub created_at: String,
}

/// A member's ballot, unique per (user, vote). Re-voting overwrites
/// `option_id`; no history is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMealVote {
    pub user_id: String,
    pub username: String,
    pub vote_id: String,
    pub option_id: String,
    pub updated_at: String,
}

/// Body for `POST /families/{id}/meal-vote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealVoteRequest {
    /// The question being asked ("What should we eat tonight?").
    #[serde(alias = "question")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub recipe_ids: Vec<String>,
}

/// Body for `POST /families/{id}/meal-votes/{voteId}/vote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub option_id: String,
}

/// An option with its live tally and recipe summary.
///
/// `recipe` is null when the referenced recipe has been deleted since
/// the vote was created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub id: String,
    pub recipe_id: String,
    pub recipe: Option<RecipeSummary>,
    pub vote_count: i64,
    pub created_at: String,
}

/// A meal vote with options, tallies, and ballots, as returned by reads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealVoteView {
    #[serde(flatten)]
    pub vote: MealVote,
    pub options: Vec<OptionTally>,
    pub votes: Vec<UserMealVote>,
    pub total_votes: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invitation_status_roundtrip() {
        for s in &[
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
        ] {
            let json = serde_json::to_string(s).unwrap();
            let back: InvitationStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(InvitationStatus::from_str(s.as_str()), Some(*s));
        }
    }

    #[test]
    fn invitation_status_terminal() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Rejected.is_terminal());
    }

    #[test]
    fn member_role_roundtrip() {
        assert_eq!(serde_json::to_string(&MemberRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(MemberRole::from_str("member"), Some(MemberRole::Member));
        assert_eq!(MemberRole::from_str("owner"), None);
    }

    #[test]
    fn create_meal_vote_accepts_question_alias() {
        let req: CreateMealVoteRequest = serde_json::from_str(
            r#"{"question": "What should we eat tonight?", "recipeIds": ["r1", "r2"]}"#,
        )
        .unwrap();
        assert_eq!(req.title, "What should we eat tonight?");
        assert_eq!(req.recipe_ids.len(), 2);

        let req: CreateMealVoteRequest =
            serde_json::from_str(r#"{"title": "Lunch?", "recipeIds": []}"#).unwrap();
        assert_eq!(req.title, "Lunch?");
        assert!(req.recipe_ids.is_empty());
    }

    #[test]
    fn invitation_action_deserialize() {
        let req: ProcessInvitationRequest =
            serde_json::from_str(r#"{"action": "accept"}"#).unwrap();
        assert_eq!(req.action, InvitationAction::Accept);

        assert!(serde_json::from_str::<ProcessInvitationRequest>(r#"{"action": "maybe"}"#).is_err());
    }

    #[test]
    fn family_view_flattens() {
        let view = FamilyView {
            family: Family {
                id: "f1".into(),
                name: "Smiths".into(),
                admin_user_id: "u1".into(),
                dietary_restrictions: vec!["vegetarian".into()],
                created_at: "2026-01-01T00:00:00+00:00".into(),
                updated_at: "2026-01-01T00:00:00+00:00".into(),
            },
            members: vec![],
            meal_votes: vec![],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "f1");
        assert_eq!(json["adminUserId"], "u1");
        assert!(json["members"].as_array().unwrap().is_empty());
    }
}
