use mealhub_core::{Identity, new_id, now_rfc3339};
use mealhub_sql::{Row, Value};

use crate::model::{CreateFamilyRequest, Family, FamilyMember, FamilyView, MemberRole};
use crate::service::{FamilyError, FamilyService};

impl FamilyService {
    /// Create a family with the caller as admin and first member.
    pub fn create_family(
        &self,
        creator: &Identity,
        input: CreateFamilyRequest,
    ) -> Result<FamilyView, FamilyError> {
        if input.name.trim().is_empty() {
            return Err(FamilyError::Validation("Family name is required".into()));
        }

        let now = now_rfc3339();
        let family = Family {
            id: new_id(),
            name: input.name,
            admin_user_id: creator.user_id.clone(),
            dietary_restrictions: input.dietary_restrictions,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let data =
            serde_json::to_string(&family).map_err(|e| FamilyError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO families (id, admin_user_id, name, data, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(family.id.clone()),
                    Value::Text(family.admin_user_id.clone()),
                    Value::Text(family.name.clone()),
                    Value::Text(data),
                    Value::Text(now.clone()),
                    Value::Text(now.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        self.insert_member(&family.id, creator, MemberRole::Admin, &now)?;

        tracing::info!(family_id = %family.id, admin = %creator.user_id, "created family");

        Ok(FamilyView {
            members: self.members(&family.id)?,
            meal_votes: vec![],
            family,
        })
    }

    /// Families the user belongs to, each with members and active votes.
    pub fn my_families(&self, user_id: &str) -> Result<Vec<FamilyView>, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT f.data as data FROM families f \
                 JOIN family_members m ON m.family_id = f.id \
                 WHERE m.user_id = ?1 ORDER BY f.created_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        let mut views = Vec::new();
        for row in &rows {
            let family = row_to_family(row)?;
            let members = self.members(&family.id)?;
            let meal_votes = self.active_meal_votes(&family.id)?;
            views.push(FamilyView {
                family,
                members,
                meal_votes,
            });
        }
        Ok(views)
    }

    /// Family detail. Members only.
    pub fn get_family(&self, family_id: &str, user_id: &str) -> Result<FamilyView, FamilyError> {
        self.require_member(family_id, user_id)?;

        let family = self.load_family(family_id)?;
        let members = self.members(family_id)?;
        let meal_votes = self.active_meal_votes(family_id)?;

        Ok(FamilyView {
            family,
            members,
            meal_votes,
        })
    }

    /// Delete a family. Admin only; members, invitations, and votes go
    /// with it via the schema's cascades.
    pub fn delete_family(&self, family_id: &str, user_id: &str) -> Result<(), FamilyError> {
        self.require_admin(family_id, user_id, "Only family admin can delete the family")?;

        self.sql
            .exec(
                "DELETE FROM families WHERE id = ?1",
                &[Value::Text(family_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        tracing::info!(family_id = %family_id, user_id = %user_id, "deleted family");
        Ok(())
    }

    /// Leave a family. The admin cannot leave — deleting the family is
    /// their only exit; this is a business rule, not a DB constraint.
    pub fn leave_family(&self, family_id: &str, user_id: &str) -> Result<(), FamilyError> {
        self.require_member(family_id, user_id)?;

        let family = self.load_family(family_id)?;
        if family.admin_user_id == user_id {
            return Err(FamilyError::AdminCannotLeave);
        }

        self.sql
            .exec(
                "DELETE FROM family_members WHERE family_id = ?1 AND user_id = ?2",
                &[
                    Value::Text(family_id.to_string()),
                    Value::Text(user_id.to_string()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Members of a family, admin first, then by join time.
    pub fn members(&self, family_id: &str) -> Result<Vec<FamilyMember>, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT family_id, user_id, username, role, joined_at FROM family_members \
                 WHERE family_id = ?1 ORDER BY role ASC, joined_at ASC",
                &[Value::Text(family_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        rows.iter().map(row_to_member).collect()
    }

    // -----------------------------------------------------------------------
    // Shared guards and helpers
    // -----------------------------------------------------------------------

    pub(crate) fn is_member(&self, family_id: &str, user_id: &str) -> Result<bool, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT 1 as present FROM family_members WHERE family_id = ?1 AND user_id = ?2",
                &[
                    Value::Text(family_id.to_string()),
                    Value::Text(user_id.to_string()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    pub(crate) fn require_member(&self, family_id: &str, user_id: &str) -> Result<(), FamilyError> {
        if !self.is_member(family_id, user_id)? {
            return Err(FamilyError::NotAMember);
        }
        Ok(())
    }

    /// Require the caller to be the family admin. Like the ownership
    /// checks elsewhere, a missing family and a non-admin caller get the
    /// same answer.
    pub(crate) fn require_admin(
        &self,
        family_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<(), FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT 1 as present FROM families WHERE id = ?1 AND admin_user_id = ?2",
                &[
                    Value::Text(family_id.to_string()),
                    Value::Text(user_id.to_string()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;
        if rows.is_empty() {
            return Err(FamilyError::NotAdmin(message.to_string()));
        }
        Ok(())
    }

    pub(crate) fn load_family(&self, family_id: &str) -> Result<Family, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM families WHERE id = ?1",
                &[Value::Text(family_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| FamilyError::NotFound("Family not found".into()))?;
        row_to_family(row)
    }

    pub(crate) fn insert_member(
        &self,
        family_id: &str,
        user: &Identity,
        role: MemberRole,
        joined_at: &str,
    ) -> Result<(), FamilyError> {
        self.sql
            .exec(
                "INSERT INTO family_members (family_id, user_id, username, role, joined_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(family_id.to_string()),
                    Value::Text(user.user_id.clone()),
                    Value::Text(user.username.clone()),
                    Value::Text(role.as_str().to_string()),
                    Value::Text(joined_at.to_string()),
                ],
            )
            .map_err(|e| {
                if e.is_unique_violation() {
                    FamilyError::AlreadyMember
                } else {
                    FamilyError::Storage(e.to_string())
                }
            })?;
        Ok(())
    }
}

/// Deserialize a Family from a row's `data` JSON column.
fn row_to_family(row: &Row) -> Result<Family, FamilyError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| FamilyError::Internal("missing data column".into()))?;
    serde_json::from_str(json).map_err(|e| FamilyError::Internal(format!("bad family json: {e}")))
}

fn row_to_member(row: &Row) -> Result<FamilyMember, FamilyError> {
    let role_str = row
        .get_str("role")
        .ok_or_else(|| FamilyError::Internal("missing role column".into()))?;
    Ok(FamilyMember {
        family_id: row
            .get_str("family_id")
            .ok_or_else(|| FamilyError::Internal("missing family_id column".into()))?
            .to_string(),
        user_id: row
            .get_str("user_id")
            .ok_or_else(|| FamilyError::Internal("missing user_id column".into()))?
            .to_string(),
        username: row
            .get_str("username")
            .ok_or_else(|| FamilyError::Internal("missing username column".into()))?
            .to_string(),
        role: MemberRole::from_str(role_str)
            .ok_or_else(|| FamilyError::Internal(format!("bad role: {role_str}")))?,
        joined_at: row
            .get_str("joined_at")
            .ok_or_else(|| FamilyError::Internal("missing joined_at column".into()))?
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;

    fn create_req(name: &str) -> CreateFamilyRequest {
        CreateFamilyRequest {
            name: name.into(),
            dietary_restrictions: vec![],
        }
    }

    #[test]
    fn creator_becomes_admin_member() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");

        let view = svc.create_family(&alice, create_req("Smiths")).unwrap();
        assert_eq!(view.family.admin_user_id, alice.user_id);
        assert_eq!(view.members.len(), 1);
        assert_eq!(view.members[0].role, MemberRole::Admin);
        assert_eq!(view.members[0].username, "alice");
    }

    #[test]
    fn name_required() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");
        assert!(matches!(
            svc.create_family(&alice, create_req("  ")),
            Err(FamilyError::Validation(_))
        ));
    }

    #[test]
    fn get_family_requires_membership() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");
        let bob = dir.add("bob");

        let view = svc.create_family(&alice, create_req("Smiths")).unwrap();

        assert!(svc.get_family(&view.family.id, &alice.user_id).is_ok());
        assert!(matches!(
            svc.get_family(&view.family.id, &bob.user_id),
            Err(FamilyError::NotAMember)
        ));
    }

    #[test]
    fn my_families_lists_memberships() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");
        let bob = dir.add("bob");

        svc.create_family(&alice, create_req("Smiths")).unwrap();
        svc.create_family(&bob, create_req("Jones")).unwrap();

        let mine = svc.my_families(&alice.user_id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].family.name, "Smiths");
    }

    #[test]
    fn delete_family_admin_only_and_cascades() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");
        let bob = dir.add("bob");

        let view = svc.create_family(&alice, create_req("Smiths")).unwrap();

        assert!(matches!(
            svc.delete_family(&view.family.id, &bob.user_id),
            Err(FamilyError::NotAdmin(_))
        ));

        svc.delete_family(&view.family.id, &alice.user_id).unwrap();
        assert!(svc.my_families(&alice.user_id).unwrap().is_empty());

        // Member rows are gone with the family.
        let rows = svc
            .sql
            .query("SELECT COUNT(*) as cnt FROM family_members", &[])
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(0));
    }

    #[test]
    fn admin_cannot_leave() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");

        let view = svc.create_family(&alice, create_req("Smiths")).unwrap();
        assert!(matches!(
            svc.leave_family(&view.family.id, &alice.user_id),
            Err(FamilyError::AdminCannotLeave)
        ));
    }

    #[test]
    fn member_can_leave() {
        let (svc, dir) = test_service();
        let alice = dir.add("alice");
        let bob = dir.add("bob");

        let view = svc.create_family(&alice, create_req("Smiths")).unwrap();
        svc.insert_member(&view.family.id, &bob, MemberRole::Member, &now_rfc3339())
            .unwrap();

        svc.leave_family(&view.family.id, &bob.user_id).unwrap();
        assert_eq!(svc.members(&view.family.id).unwrap().len(), 1);

        // Not a member anymore.
        assert!(matches!(
            svc.leave_family(&view.family.id, &bob.user_id),
            Err(FamilyError::NotAMember)
        ));
    }
}
