//! Meal-vote workflow: time-boxed family polls over recipe options.

use std::collections::HashSet;

use chrono::{Duration, Utc};

use mealhub_core::{Identity, new_id, now_rfc3339, parse_rfc3339};
use mealhub_sql::{Row, Value};

use crate::model::{
    CreateMealVoteRequest, MealVote, MealVoteOption, MealVoteView, OptionTally, SubmitVoteRequest,
    UserMealVote,
};
use crate::service::{FamilyError, FamilyService};

/// Polls close a fixed 24 hours after creation.
const VOTE_DURATION_HOURS: i64 = 24;

impl FamilyService {
    /// Create a meal vote with one option per recipe id. Any member may
    /// start one; it closes 24 hours later.
    pub fn create_meal_vote(
        &self,
        family_id: &str,
        creator: &Identity,
        input: CreateMealVoteRequest,
    ) -> Result<MealVoteView, FamilyError> {
        self.require_member(family_id, &creator.user_id)?;

        if input.title.trim().is_empty() || input.recipe_ids.is_empty() {
            return Err(FamilyError::Validation(
                "Question and recipe options are required".into(),
            ));
        }

        if !self.config.allow_duplicate_options {
            let mut seen = HashSet::new();
            if !input.recipe_ids.iter().all(|id| seen.insert(id)) {
                return Err(FamilyError::Validation(
                    "Duplicate recipe options are not allowed".into(),
                ));
            }
        }

        let now = Utc::now();
        let vote = MealVote {
            id: new_id(),
            family_id: family_id.to_string(),
            title: input.title,
            description: input
                .description
                .unwrap_or_else(|| format!("Meal vote created by {}", creator.username)),
            ends_at: (now + Duration::hours(VOTE_DURATION_HOURS)).to_rfc3339(),
            is_active: true,
            created_at: now.to_rfc3339(),
        };

        let data =
            serde_json::to_string(&vote).map_err(|e| FamilyError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO meal_votes (id, family_id, is_active, ends_at, data, created_at) \
                 VALUES (?1, ?2, 1, ?3, ?4, ?5)",
                &[
                    Value::Text(vote.id.clone()),
                    Value::Text(vote.family_id.clone()),
                    Value::Text(vote.ends_at.clone()),
                    Value::Text(data),
                    Value::Text(vote.created_at.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        // The referenced recipes are not verified to exist; a stale id
        // just renders with a null recipe in reads.
        for recipe_id in &input.recipe_ids {
            self.sql
                .exec(
                    "INSERT INTO meal_vote_options (id, vote_id, recipe_id, created_at) \
                     VALUES (?1, ?2, ?3, ?4)",
                    &[
                        Value::Text(new_id()),
                        Value::Text(vote.id.clone()),
                        Value::Text(recipe_id.clone()),
                        Value::Text(now_rfc3339()),
                    ],
                )
                .map_err(|e| FamilyError::Storage(e.to_string()))?;
        }

        tracing::info!(vote_id = %vote.id, family_id = %family_id, "created meal vote");
        self.meal_vote_view(&vote)
    }

    /// All meal votes of a family with live tallies, newest first.
    /// Members only.
    pub fn list_meal_votes(
        &self,
        family_id: &str,
        user_id: &str,
    ) -> Result<Vec<MealVoteView>, FamilyError> {
        self.require_member(family_id, user_id)?;

        let rows = self
            .sql
            .query(
                "SELECT data FROM meal_votes WHERE family_id = ?1 ORDER BY created_at DESC",
                &[Value::Text(family_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| self.meal_vote_view(&row_to_vote(row)?))
            .collect()
    }

    /// Submit (or change) the caller's ballot.
    ///
    /// All guards — membership, vote existence/ownership, activity,
    /// expiry, option ownership — run before the upsert; a failed guard
    /// leaves no partial state.
    pub fn submit_vote(
        &self,
        family_id: &str,
        vote_id: &str,
        voter: &Identity,
        input: SubmitVoteRequest,
    ) -> Result<UserMealVote, FamilyError> {
        if input.option_id.trim().is_empty() {
            return Err(FamilyError::Validation("Vote option is required".into()));
        }

        self.require_member(family_id, &voter.user_id)?;

        // The row may still exist with is_active=1 after ends_at; the
        // expiry check is on the clock, not the flag.
        let vote = self.load_vote(vote_id)?;
        let expired = parse_rfc3339(&vote.ends_at)
            .map(|ends| Utc::now() >= ends)
            .unwrap_or(true);
        if vote.family_id != family_id || !vote.is_active || expired {
            return Err(FamilyError::VoteNotFoundOrExpired);
        }

        let option_rows = self
            .sql
            .query(
                "SELECT 1 as present FROM meal_vote_options WHERE id = ?1 AND vote_id = ?2",
                &[
                    Value::Text(input.option_id.clone()),
                    Value::Text(vote_id.to_string()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;
        if option_rows.is_empty() {
            return Err(FamilyError::OptionNotFound);
        }

        let ballot = UserMealVote {
            user_id: voter.user_id.clone(),
            username: voter.username.clone(),
            vote_id: vote_id.to_string(),
            option_id: input.option_id,
            updated_at: now_rfc3339(),
        };

        // Re-voting replaces the prior choice; no history is kept.
        self.sql
            .exec(
                "INSERT INTO user_meal_votes (user_id, vote_id, option_id, username, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(user_id, vote_id) DO UPDATE SET \
                 option_id = excluded.option_id, updated_at = excluded.updated_at",
                &[
                    Value::Text(ballot.user_id.clone()),
                    Value::Text(ballot.vote_id.clone()),
                    Value::Text(ballot.option_id.clone()),
                    Value::Text(ballot.username.clone()),
                    Value::Text(ballot.updated_at.clone()),
                ],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        Ok(ballot)
    }

    /// Explicitly end a vote. Admin only; terminal.
    pub fn end_meal_vote(
        &self,
        family_id: &str,
        vote_id: &str,
        user_id: &str,
    ) -> Result<MealVoteView, FamilyError> {
        self.require_admin(family_id, user_id, "Only family admin can end a meal vote")?;

        let mut vote = self.load_vote(vote_id)?;
        if vote.family_id != family_id {
            return Err(FamilyError::NotFound("Vote not found".into()));
        }

        vote.is_active = false;
        let data =
            serde_json::to_string(&vote).map_err(|e| FamilyError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "UPDATE meal_votes SET is_active = 0, data = ?1 WHERE id = ?2",
                &[Value::Text(data), Value::Text(vote.id.clone())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        self.meal_vote_view(&vote)
    }

    /// Active, unexpired meal votes of a family with tallies.
    pub(crate) fn active_meal_votes(
        &self,
        family_id: &str,
    ) -> Result<Vec<MealVoteView>, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM meal_votes WHERE family_id = ?1 AND is_active = 1 \
                 ORDER BY created_at DESC",
                &[Value::Text(family_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        let now = Utc::now();
        let mut views = Vec::new();
        for row in &rows {
            let vote = row_to_vote(row)?;
            let live = parse_rfc3339(&vote.ends_at)
                .map(|ends| now < ends)
                .unwrap_or(false);
            if live {
                views.push(self.meal_vote_view(&vote)?);
            }
        }
        Ok(views)
    }

    /// Build the read view: options with recipe summaries and per-option
    /// ballot counts, plus the raw ballots. The tally is computed here
    /// on every read, never stored.
    fn meal_vote_view(&self, vote: &MealVote) -> Result<MealVoteView, FamilyError> {
        let option_rows = self
            .sql
            .query(
                "SELECT id, vote_id, recipe_id, created_at FROM meal_vote_options \
                 WHERE vote_id = ?1 ORDER BY created_at ASC, id ASC",
                &[Value::Text(vote.id.clone())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        let mut options = Vec::new();
        for row in &option_rows {
            let option = row_to_option(row)?;

            let count_rows = self
                .sql
                .query(
                    "SELECT COUNT(*) as cnt FROM user_meal_votes WHERE option_id = ?1",
                    &[Value::Text(option.id.clone())],
                )
                .map_err(|e| FamilyError::Storage(e.to_string()))?;
            let vote_count = count_rows
                .first()
                .and_then(|r| r.get_i64("cnt"))
                .unwrap_or(0);

            let recipe = self
                .catalog
                .summarize(&option.recipe_id)
                .map_err(|e| FamilyError::Storage(e.to_string()))?;

            options.push(OptionTally {
                id: option.id,
                recipe_id: option.recipe_id,
                recipe,
                vote_count,
                created_at: option.created_at,
            });
        }

        let ballot_rows = self
            .sql
            .query(
                "SELECT user_id, vote_id, option_id, username, updated_at FROM user_meal_votes \
                 WHERE vote_id = ?1 ORDER BY updated_at ASC",
                &[Value::Text(vote.id.clone())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;
        let votes = ballot_rows
            .iter()
            .map(row_to_ballot)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MealVoteView {
            vote: vote.clone(),
            total_votes: votes.len() as i64,
            options,
            votes,
        })
    }

    fn load_vote(&self, vote_id: &str) -> Result<MealVote, FamilyError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM meal_votes WHERE id = ?1",
                &[Value::Text(vote_id.to_string())],
            )
            .map_err(|e| FamilyError::Storage(e.to_string()))?;

        rows.first()
            .map(row_to_vote)
            .transpose()?
            .ok_or(FamilyError::VoteNotFoundOrExpired)
    }
}

/// Deserialize a MealVote from a row's `data` JSON column.
fn row_to_vote(row: &Row) -> Result<MealVote, FamilyError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| FamilyError::Internal("missing data column".into()))?;
    serde_json::from_str(json)
        .map_err(|e| FamilyError::Internal(format!("bad meal vote json: {e}")))
}

fn row_to_option(row: &Row) -> Result<MealVoteOption, FamilyError> {
    let get = |name: &str| -> Result<String, FamilyError> {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| FamilyError::Internal(format!("missing {name} column")))
    };
    Ok(MealVoteOption {
        id: get("id")?,
        vote_id: get("vote_id")?,
        recipe_id: get("recipe_id")?,
        created_at: get("created_at")?,
    })
}

fn row_to_ballot(row: &Row) -> Result<UserMealVote, FamilyError> {
    let get = |name: &str| -> Result<String, FamilyError> {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| FamilyError::Internal(format!("missing {name} column")))
    };
    Ok(UserMealVote {
        user_id: get("user_id")?,
        username: get("username")?,
        vote_id: get("vote_id")?,
        option_id: get("option_id")?,
        updated_at: get("updated_at")?,
    })
}
