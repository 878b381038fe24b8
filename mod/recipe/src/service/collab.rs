//! Collaborator trait implementations exposed to the other modules.

use mealhub_core::{ContributionStats, RecipeCatalog, RecipeSummary, ServiceError};
use mealhub_sql::Value;

use crate::service::{RecipeService, row_to_recipe};

impl RecipeCatalog for RecipeService {
    fn summarize(&self, recipe_id: &str) -> Result<Option<RecipeSummary>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM recipes WHERE id = ?1",
                &[Value::Text(recipe_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let recipe = row_to_recipe(row).map_err(ServiceError::from)?;

        Ok(Some(RecipeSummary {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            difficulty: recipe.difficulty.as_str().to_string(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            images: recipe.images,
        }))
    }
}

impl ContributionStats for RecipeService {
    fn recipe_count(&self, user_id: &str) -> Result<i64, ServiceError> {
        self.count_by_user("recipes", user_id)
    }

    fn comment_count(&self, user_id: &str) -> Result<i64, ServiceError> {
        self.count_by_user("comments", user_id)
    }
}

impl RecipeService {
    fn count_by_user(&self, table: &str, user_id: &str) -> Result<i64, ServiceError> {
        let sql = format!("SELECT COUNT(*) as cnt FROM {table} WHERE user_id = ?1");
        let rows = self
            .sql
            .query(&sql, &[Value::Text(user_id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use mealhub_core::{ContributionStats, Identity, RecipeCatalog};

    use crate::model::CreateCommentRequest;
    use crate::service::test_support::{create_req, test_service};

    fn identity(name: &str) -> Identity {
        Identity {
            user_id: format!("id-{name}"),
            email: format!("{name}@example.com"),
            username: name.into(),
        }
    }

    #[test]
    fn summarize_existing_and_missing() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Guvec")).unwrap();

        let summary = svc.summarize(&recipe.id).unwrap().unwrap();
        assert_eq!(summary.title, "Guvec");
        assert_eq!(summary.difficulty, "easy");

        assert!(svc.summarize("missing").unwrap().is_none());
    }

    #[test]
    fn contribution_counts() {
        let (svc, _) = test_service();
        let alice = identity("alice");
        let recipe = svc.create_recipe(&alice, create_req("Ezogelin")).unwrap();
        svc.create_recipe(&alice, create_req("Mercimek")).unwrap();

        svc.add_comment(
            &identity("bob"),
            &recipe.id,
            CreateCommentRequest {
                content: "nice".into(),
                rating: None,
            },
        )
        .unwrap();

        assert_eq!(svc.recipe_count("id-alice").unwrap(), 2);
        assert_eq!(svc.comment_count("id-alice").unwrap(), 0);
        assert_eq!(svc.comment_count("id-bob").unwrap(), 1);
    }
}
