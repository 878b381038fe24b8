use mealhub_core::{Identity, ListParams, ListResult, new_id, now_rfc3339};
use mealhub_sql::{Row, Value};

use crate::model::{AuthorRef, Comment, CreateCommentRequest, LikeOutcome};
use crate::service::{RecipeError, RecipeService};

impl RecipeService {
    /// Toggle the caller's like on a recipe.
    ///
    /// The first call likes, the second unlikes. The (user, recipe)
    /// primary key on the fact table makes a double-like impossible even
    /// under concurrent retries: the losing insert surfaces as a unique
    /// violation and flips into the unlike branch.
    pub fn toggle_like(&self, user_id: &str, recipe_id: &str) -> Result<LikeOutcome, RecipeError> {
        self.ensure_recipe_exists(recipe_id)?;

        let inserted = self.sql.exec(
            "INSERT INTO recipe_likes (user_id, recipe_id, created_at) VALUES (?1, ?2, ?3)",
            &[
                Value::Text(user_id.to_string()),
                Value::Text(recipe_id.to_string()),
                Value::Text(now_rfc3339()),
            ],
        );

        let liked = match inserted {
            Ok(_) => true,
            Err(e) if e.is_unique_violation() => {
                self.sql
                    .exec(
                        "DELETE FROM recipe_likes WHERE user_id = ?1 AND recipe_id = ?2",
                        &[
                            Value::Text(user_id.to_string()),
                            Value::Text(recipe_id.to_string()),
                        ],
                    )
                    .map_err(|e| RecipeError::Storage(e.to_string()))?;
                false
            }
            Err(e) => return Err(RecipeError::Storage(e.to_string())),
        };

        self.refresh_engagement(recipe_id)?;

        let likes_count = self
            .sql
            .query(
                "SELECT likes_count FROM recipes WHERE id = ?1",
                &[Value::Text(recipe_id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?
            .first()
            .and_then(|r| r.get_i64("likes_count"))
            .unwrap_or(0);

        Ok(LikeOutcome { liked, likes_count })
    }

    /// Whether the user currently likes the recipe.
    pub fn is_liked(&self, user_id: &str, recipe_id: &str) -> Result<bool, RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT 1 as present FROM recipe_likes WHERE user_id = ?1 AND recipe_id = ?2",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(recipe_id.to_string()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    /// Record the caller's first view of a recipe.
    ///
    /// Repeat views succeed silently without touching the counter.
    pub fn record_view(&self, user_id: &str, recipe_id: &str) -> Result<(), RecipeError> {
        self.ensure_recipe_exists(recipe_id)?;

        let affected = self
            .sql
            .exec(
                "INSERT OR IGNORE INTO recipe_views (user_id, recipe_id, created_at) \
                 VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(recipe_id.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        if affected > 0 {
            self.refresh_engagement(recipe_id)?;
        }
        Ok(())
    }

    /// Add a comment to a recipe.
    pub fn add_comment(
        &self,
        author: &Identity,
        recipe_id: &str,
        input: CreateCommentRequest,
    ) -> Result<Comment, RecipeError> {
        if input.content.trim().is_empty() {
            return Err(RecipeError::Validation("comment content is required".into()));
        }
        if let Some(rating) = input.rating {
            if !(1..=5).contains(&rating) {
                return Err(RecipeError::Validation("rating must be between 1 and 5".into()));
            }
        }

        self.ensure_recipe_exists(recipe_id)?;

        let profile_image = self
            .directory
            .resolve(None, Some(&author.username))
            .ok()
            .flatten()
            .and_then(|u| u.profile_image);

        let comment = Comment {
            id: new_id(),
            recipe_id: recipe_id.to_string(),
            user: AuthorRef {
                id: author.user_id.clone(),
                username: author.username.clone(),
                profile_image,
            },
            content: input.content,
            rating: input.rating,
            created_at: now_rfc3339(),
        };

        let data =
            serde_json::to_string(&comment).map_err(|e| RecipeError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO comments (id, recipe_id, user_id, data, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(comment.id.clone()),
                    Value::Text(comment.recipe_id.clone()),
                    Value::Text(comment.user.id.clone()),
                    Value::Text(data),
                    Value::Text(comment.created_at.clone()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        self.refresh_engagement(recipe_id)?;
        Ok(comment)
    }

    /// List a recipe's comments, newest first.
    pub fn list_comments(
        &self,
        recipe_id: &str,
        params: &ListParams,
    ) -> Result<ListResult<Comment>, RecipeError> {
        let count_rows = self
            .sql
            .query(
                "SELECT COUNT(*) as cnt FROM comments WHERE recipe_id = ?1",
                &[Value::Text(recipe_id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let rows = self
            .sql
            .query(
                "SELECT data FROM comments WHERE recipe_id = ?1 \
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                &[
                    Value::Text(recipe_id.to_string()),
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_comment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListResult { items, total })
    }

    fn ensure_recipe_exists(&self, recipe_id: &str) -> Result<(), RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT 1 as present FROM recipes WHERE id = ?1",
                &[Value::Text(recipe_id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
        if rows.is_empty() {
            return Err(RecipeError::NotFound("Recipe not found".into()));
        }
        Ok(())
    }
}

/// Deserialize a Comment from a row's `data` JSON column.
fn row_to_comment(row: &Row) -> Result<Comment, RecipeError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| RecipeError::Internal("missing data column".into()))?;
    serde_json::from_str(json).map_err(|e| RecipeError::Internal(format!("bad comment json: {e}")))
}
