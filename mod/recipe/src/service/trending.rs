//! Trending-score engine.
//!
//! Every like, unlike, view, and comment recounts the engagement
//! counters from the fact tables and recomputes a popularity score that
//! decays with recipe age. The recompute is synchronous with the
//! triggering request; there is no batching or background refresh.

use chrono::{DateTime, Utc};

use mealhub_core::{ListParams, parse_rfc3339};
use mealhub_sql::Value;

use crate::model::Recipe;
use crate::service::{RecipeError, RecipeService, row_to_recipe};

/// Days until the age factor bottoms out.
const AGE_DECAY_DAYS: f64 = 180.0;
/// Old recipes keep this floor instead of decaying to zero.
const AGE_FACTOR_FLOOR: f64 = 0.1;

const LIKE_WEIGHT: f64 = 3.0;
const COMMENT_WEIGHT: f64 = 5.0;
const VIEW_WEIGHT: f64 = 0.1;

/// Linear age decay: 1.0 at age zero, floored at 0.1 from 180 days on.
pub fn age_factor(age_days: f64) -> f64 {
    (1.0 - age_days / AGE_DECAY_DAYS).max(AGE_FACTOR_FLOOR)
}

/// Weighted engagement: comments signal deeper engagement than likes,
/// views are the cheapest signal.
pub fn interaction_score(likes: i64, comments: i64, views: i64) -> f64 {
    likes as f64 * LIKE_WEIGHT + comments as f64 * COMMENT_WEIGHT + views as f64 * VIEW_WEIGHT
}

/// Trending score of a recipe with the given counters at `now`.
pub fn score_at(
    likes: i64,
    comments: i64,
    views: i64,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let age_days = (now - created_at).num_seconds() as f64 / 86_400.0;
    interaction_score(likes, comments, views) * age_factor(age_days)
}

impl RecipeService {
    /// Recount engagement counters from the fact tables and recompute
    /// the trending score.
    ///
    /// Counters are never incremented in place: recounting from the
    /// like/comment/view rows before each write keeps the denormalized
    /// columns from drifting after partial failures. A recipe deleted
    /// between the triggering interaction and this recompute is a silent
    /// no-op, not an error.
    pub fn refresh_engagement(&self, recipe_id: &str) -> Result<(), RecipeError> {
        let mut recipe = match self.load_for_refresh(recipe_id)? {
            Some(recipe) => recipe,
            None => return Ok(()),
        };

        recipe.likes_count = self.count_rows("recipe_likes", recipe_id)?;
        recipe.comments_count = self.count_rows("comments", recipe_id)?;
        recipe.views_count = self.count_rows("recipe_views", recipe_id)?;

        let created_at = parse_rfc3339(&recipe.created_at)
            .ok_or_else(|| RecipeError::Internal("bad created_at timestamp".into()))?;
        recipe.trending_score = score_at(
            recipe.likes_count,
            recipe.comments_count,
            recipe.views_count,
            created_at,
            Utc::now(),
        );

        match self.persist_recipe(&recipe) {
            Ok(()) => Ok(()),
            // Deleted concurrently; nothing left to score.
            Err(RecipeError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Recipes with a positive trending score, best first, newest first
    /// on ties.
    pub fn trending_recipes(&self, params: &ListParams) -> Result<Vec<Recipe>, RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM recipes WHERE trending_score > 0 \
                 ORDER BY trending_score DESC, created_at DESC LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        rows.iter().map(row_to_recipe).collect()
    }

    fn load_for_refresh(&self, recipe_id: &str) -> Result<Option<Recipe>, RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM recipes WHERE id = ?1",
                &[Value::Text(recipe_id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        rows.first().map(row_to_recipe).transpose()
    }

    fn count_rows(&self, table: &str, recipe_id: &str) -> Result<i64, RecipeError> {
        let sql = format!("SELECT COUNT(*) as cnt FROM {table} WHERE recipe_id = ?1");
        let rows = self
            .sql
            .query(&sql, &[Value::Text(recipe_id.to_string())])
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }
}
