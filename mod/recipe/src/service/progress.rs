use mealhub_core::now_rfc3339;
use mealhub_sql::{Row, Value};

use crate::model::{AteMealRequest, CompleteCookingRequest, CompletionStatus, UserProgress};
use crate::service::{RecipeError, RecipeService};

impl RecipeService {
    /// Start (or restart) cooking a recipe.
    ///
    /// Upserts the caller's progress row back to IN_PROGRESS with a
    /// fresh start timestamp.
    pub fn start_cooking(&self, user_id: &str, recipe_id: &str) -> Result<UserProgress, RecipeError> {
        self.ensure_recipe(recipe_id)?;

        let now = now_rfc3339();
        let progress = match self.get_progress(user_id, recipe_id)? {
            Some(mut existing) => {
                existing.completion_status = CompletionStatus::InProgress;
                existing.started_at = Some(now.clone());
                existing.completed_at = None;
                existing.updated_at = now;
                existing
            }
            None => UserProgress {
                user_id: user_id.to_string(),
                recipe_id: recipe_id.to_string(),
                completion_status: CompletionStatus::InProgress,
                did_eat: false,
                started_at: Some(now.clone()),
                completed_at: None,
                updated_at: now,
            },
        };

        self.upsert_progress(&progress)?;
        Ok(progress)
    }

    /// Finish cooking. Requires an existing progress row; credits
    /// calories when the meal was eaten.
    pub fn complete_cooking(
        &self,
        user_id: &str,
        recipe_id: &str,
        input: CompleteCookingRequest,
    ) -> Result<UserProgress, RecipeError> {
        let mut progress = self.get_progress(user_id, recipe_id)?.ok_or_else(|| {
            RecipeError::NotFound("No cooking in progress for this recipe".into())
        })?;

        let now = now_rfc3339();
        progress.completion_status = CompletionStatus::Completed;
        progress.did_eat = input.did_eat;
        progress.completed_at = Some(now.clone());
        progress.updated_at = now;

        self.upsert_progress(&progress)?;

        if input.did_eat {
            self.credit_calories(user_id, input.calories_consumed);
        }

        Ok(progress)
    }

    /// Record that the user ate this meal, independent of cooking state.
    ///
    /// Upserts straight to COMPLETED + didEat when cooking was never
    /// started; an existing row only gains the didEat flag.
    pub fn ate_meal(
        &self,
        user_id: &str,
        recipe_id: &str,
        input: AteMealRequest,
    ) -> Result<UserProgress, RecipeError> {
        self.ensure_recipe(recipe_id)?;

        let now = now_rfc3339();
        let progress = match self.get_progress(user_id, recipe_id)? {
            Some(mut existing) => {
                existing.did_eat = true;
                existing.updated_at = now;
                existing
            }
            None => UserProgress {
                user_id: user_id.to_string(),
                recipe_id: recipe_id.to_string(),
                completion_status: CompletionStatus::Completed,
                did_eat: true,
                started_at: None,
                completed_at: Some(now.clone()),
                updated_at: now,
            },
        };

        self.upsert_progress(&progress)?;
        self.credit_calories(user_id, input.calories_consumed);

        Ok(progress)
    }

    /// Get the caller's progress for a recipe, if any.
    pub fn get_progress(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<Option<UserProgress>, RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM user_progress WHERE user_id = ?1 AND recipe_id = ?2",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(recipe_id.to_string()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        rows.first().map(row_to_progress).transpose()
    }

    fn upsert_progress(&self, progress: &UserProgress) -> Result<(), RecipeError> {
        let data =
            serde_json::to_string(progress).map_err(|e| RecipeError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO user_progress (user_id, recipe_id, completion_status, did_eat, data, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(user_id, recipe_id) DO UPDATE SET \
                 completion_status = excluded.completion_status, \
                 did_eat = excluded.did_eat, \
                 data = excluded.data, \
                 updated_at = excluded.updated_at",
                &[
                    Value::Text(progress.user_id.clone()),
                    Value::Text(progress.recipe_id.clone()),
                    Value::Text(progress.completion_status.as_str().to_string()),
                    Value::Integer(if progress.did_eat { 1 } else { 0 }),
                    Value::Text(data),
                    Value::Text(progress.updated_at.clone()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Credit eaten calories to the user's daily total. A failed credit
    /// is logged, not surfaced: the progress row is already written and
    /// the meal already eaten.
    fn credit_calories(&self, user_id: &str, calories: Option<i64>) {
        let Some(calories) = calories else { return };
        if calories <= 0 {
            return;
        }
        if let Err(e) = self.ledger.add_calories(user_id, calories) {
            tracing::warn!(user_id = %user_id, error = %e, "calorie credit failed");
        }
    }

    fn ensure_recipe(&self, recipe_id: &str) -> Result<(), RecipeError> {
        self.get_recipe(recipe_id).map(|_| ())
    }
}

/// Deserialize a UserProgress from a row's `data` JSON column.
fn row_to_progress(row: &Row) -> Result<UserProgress, RecipeError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| RecipeError::Internal("missing data column".into()))?;
    serde_json::from_str(json).map_err(|e| RecipeError::Internal(format!("bad progress json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{create_req, test_service};
    use mealhub_core::Identity;

    fn identity(name: &str) -> Identity {
        Identity {
            user_id: format!("id-{name}"),
            email: format!("{name}@example.com"),
            username: name.into(),
        }
    }

    #[test]
    fn start_then_complete() {
        let (svc, ledger) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Karniyarik")).unwrap();

        let started = svc.start_cooking("id-bob", &recipe.id).unwrap();
        assert_eq!(started.completion_status, CompletionStatus::InProgress);
        assert!(started.started_at.is_some());
        assert!(!started.did_eat);

        let done = svc
            .complete_cooking(
                "id-bob",
                &recipe.id,
                CompleteCookingRequest {
                    did_eat: true,
                    calories_consumed: Some(600),
                },
            )
            .unwrap();
        assert_eq!(done.completion_status, CompletionStatus::Completed);
        assert!(done.did_eat);
        assert!(done.completed_at.is_some());

        let credits = ledger.credits.lock().unwrap();
        assert_eq!(credits.as_slice(), &[("id-bob".to_string(), 600)]);
    }

    #[test]
    fn complete_without_start_fails() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Corba")).unwrap();

        let result = svc.complete_cooking("id-bob", &recipe.id, CompleteCookingRequest::default());
        assert!(matches!(result, Err(RecipeError::NotFound(_))));
    }

    #[test]
    fn complete_without_eating_credits_nothing() {
        let (svc, ledger) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Pide")).unwrap();

        svc.start_cooking("id-bob", &recipe.id).unwrap();
        svc.complete_cooking(
            "id-bob",
            &recipe.id,
            CompleteCookingRequest {
                did_eat: false,
                calories_consumed: Some(500),
            },
        )
        .unwrap();

        assert!(ledger.credits.lock().unwrap().is_empty());
    }

    #[test]
    fn ate_meal_upserts_without_cooking() {
        let (svc, ledger) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Simit")).unwrap();

        let progress = svc
            .ate_meal(
                "id-bob",
                &recipe.id,
                AteMealRequest {
                    calories_consumed: Some(250),
                },
            )
            .unwrap();
        assert_eq!(progress.completion_status, CompletionStatus::Completed);
        assert!(progress.did_eat);
        assert!(progress.started_at.is_none());

        assert_eq!(
            ledger.credits.lock().unwrap().as_slice(),
            &[("id-bob".to_string(), 250)]
        );
    }

    #[test]
    fn ate_meal_keeps_existing_status() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Lahmacun")).unwrap();

        svc.start_cooking("id-bob", &recipe.id).unwrap();
        let progress = svc
            .ate_meal("id-bob", &recipe.id, AteMealRequest::default())
            .unwrap();

        // Still cooking, but the meal was eaten.
        assert_eq!(progress.completion_status, CompletionStatus::InProgress);
        assert!(progress.did_eat);
    }

    #[test]
    fn one_row_per_user_and_recipe() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Kofte")).unwrap();

        svc.start_cooking("id-bob", &recipe.id).unwrap();
        svc.start_cooking("id-bob", &recipe.id).unwrap();
        svc.ate_meal("id-bob", &recipe.id, AteMealRequest::default()).unwrap();

        let rows = svc
            .sql
            .query(
                "SELECT COUNT(*) as cnt FROM user_progress WHERE user_id = 'id-bob'",
                &[],
            )
            .unwrap();
        assert_eq!(rows[0].get_i64("cnt"), Some(1));
    }
}
