use mealhub_sql::SQLStore;

use crate::service::FamilyError;

/// Initialize the SQLite schema for the family module.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), FamilyError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS families (
            id TEXT PRIMARY KEY,
            admin_user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_families_admin ON families(admin_user_id)",

        // One membership per (family, user); deleting the family takes
        // the members with it.
        "CREATE TABLE IF NOT EXISTS family_members (
            family_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            username TEXT NOT NULL,
            role TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (family_id, user_id),
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_family_members_user ON family_members(user_id)",

        // The target is captured as email + username at send time; the
        // pending-per-target rule is enforced by the service, not here.
        "CREATE TABLE IF NOT EXISTS family_invitations (
            id TEXT PRIMARY KEY,
            family_id TEXT NOT NULL,
            inviter_user_id TEXT NOT NULL,
            invited_email TEXT NOT NULL,
            invited_username TEXT NOT NULL,
            status TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_invitations_family ON family_invitations(family_id)",
        "CREATE INDEX IF NOT EXISTS idx_invitations_email ON family_invitations(invited_email)",
        "CREATE INDEX IF NOT EXISTS idx_invitations_username ON family_invitations(invited_username)",

        "CREATE TABLE IF NOT EXISTS meal_votes (
            id TEXT PRIMARY KEY,
            family_id TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            ends_at TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_meal_votes_family ON meal_votes(family_id)",

        "CREATE TABLE IF NOT EXISTS meal_vote_options (
            id TEXT PRIMARY KEY,
            vote_id TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (vote_id) REFERENCES meal_votes(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_vote_options_vote ON meal_vote_options(vote_id)",

        // One ballot per (user, vote); re-votes overwrite option_id.
        "CREATE TABLE IF NOT EXISTS user_meal_votes (
            user_id TEXT NOT NULL,
            vote_id TEXT NOT NULL,
            option_id TEXT NOT NULL,
            username TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, vote_id),
            FOREIGN KEY (vote_id) REFERENCES meal_votes(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_user_meal_votes_vote ON user_meal_votes(vote_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| FamilyError::Storage(e.to_string()))?;
    }

    Ok(())
}
