use mealhub_core::{Identity, ListParams, ListResult, new_id, now_rfc3339};
use mealhub_sql::Value;

use crate::model::{
    AuthorRef, CreateRecipeRequest, RandomQuery, Recipe, RecipeListQuery, UpdateRecipeRequest,
};
use crate::service::{RecipeError, RecipeService, row_to_recipe};

impl RecipeService {
    /// Create a new recipe owned by the caller.
    pub fn create_recipe(
        &self,
        author: &Identity,
        input: CreateRecipeRequest,
    ) -> Result<Recipe, RecipeError> {
        if input.title.trim().is_empty() {
            return Err(RecipeError::Validation("title is required".into()));
        }
        if input.ingredients.is_empty() {
            return Err(RecipeError::Validation("at least one ingredient is required".into()));
        }
        if input.instructions.is_empty() {
            return Err(RecipeError::Validation(
                "at least one instruction is required".into(),
            ));
        }

        // Snapshot the author's public profile into the document.
        let profile_image = self
            .directory
            .resolve(None, Some(&author.username))
            .ok()
            .flatten()
            .and_then(|u| u.profile_image);

        let now = now_rfc3339();
        let recipe = Recipe {
            id: new_id(),
            user: AuthorRef {
                id: author.user_id.clone(),
                username: author.username.clone(),
                profile_image,
            },
            title: input.title,
            description: input.description,
            difficulty: input.difficulty,
            prep_time: input.prep_time,
            cook_time: input.cook_time,
            servings: input.servings,
            cuisine_type: input.cuisine_type,
            categories: input.categories,
            calories_per_serving: input.calories_per_serving,
            nutrition_info: input.nutrition_info,
            ingredients: input.ingredients,
            instructions: input.instructions,
            images: input.images,
            likes_count: 0,
            comments_count: 0,
            views_count: 0,
            trending_score: 0.0,
            created_at: now.clone(),
            updated_at: now,
        };

        let data =
            serde_json::to_string(&recipe).map_err(|e| RecipeError::Internal(e.to_string()))?;
        let categories = serde_json::to_string(&recipe.categories)
            .map_err(|e| RecipeError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO recipes (id, user_id, title, description, difficulty, cuisine_type, \
                 categories, prep_time, likes_count, comments_count, views_count, trending_score, \
                 data, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 0, 0, 0, ?9, ?10, ?11)",
                &[
                    Value::Text(recipe.id.clone()),
                    Value::Text(recipe.user.id.clone()),
                    Value::Text(recipe.title.clone()),
                    Value::Text(recipe.description.clone()),
                    Value::Text(recipe.difficulty.as_str().to_string()),
                    Value::Text(recipe.cuisine_type.clone()),
                    Value::Text(categories),
                    Value::Integer(recipe.prep_time),
                    Value::Text(data),
                    Value::Text(recipe.created_at.clone()),
                    Value::Text(recipe.updated_at.clone()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        tracing::info!(recipe_id = %recipe.id, user_id = %recipe.user.id, "created recipe");
        Ok(recipe)
    }

    /// Get a recipe by id.
    pub fn get_recipe(&self, id: &str) -> Result<Recipe, RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM recipes WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| RecipeError::NotFound("Recipe not found".into()))?;
        row_to_recipe(row)
    }

    /// List recipes with filters, newest first.
    pub fn list_recipes(&self, query: &RecipeListQuery) -> Result<ListResult<Recipe>, RecipeError> {
        let limit = query.limit.unwrap_or(10);
        let offset = query.offset.unwrap_or(0);

        let mut where_clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref d) = query.difficulty {
            where_clauses.push(format!("difficulty = ?{idx}"));
            params.push(Value::Text(d.clone()));
            idx += 1;
        }
        if let Some(ref c) = query.cuisine_type {
            where_clauses.push(format!("cuisine_type = ?{idx}"));
            params.push(Value::Text(c.clone()));
            idx += 1;
        }
        if let Some(ref cat) = query.category {
            // Categories are stored as a JSON array; match the quoted element.
            where_clauses.push(format!("categories LIKE ?{idx}"));
            params.push(Value::Text(format!("%\"{cat}\"%")));
            idx += 1;
        }
        if let Some(ref search) = query.search {
            where_clauses.push(format!("(title LIKE ?{idx} OR description LIKE ?{idx})"));
            params.push(Value::Text(format!("%{search}%")));
            idx += 1;
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", where_clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as cnt FROM recipes {where_sql}");
        let count_rows = self
            .sql
            .query(&count_sql, &params)
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let select_sql = format!(
            "SELECT data FROM recipes {where_sql} ORDER BY created_at DESC LIMIT ?{idx} OFFSET ?{}",
            idx + 1
        );
        let mut select_params = params;
        select_params.push(Value::Integer(limit as i64));
        select_params.push(Value::Integer(offset as i64));

        let rows = self
            .sql
            .query(&select_sql, &select_params)
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_recipe)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListResult { items, total })
    }

    /// List the recipes owned by a user, newest first.
    pub fn user_recipes(
        &self,
        user_id: &str,
        params: &ListParams,
    ) -> Result<ListResult<Recipe>, RecipeError> {
        let count_rows = self
            .sql
            .query(
                "SELECT COUNT(*) as cnt FROM recipes WHERE user_id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
        let total = count_rows
            .first()
            .and_then(|r| r.get_i64("cnt"))
            .unwrap_or(0) as usize;

        let rows = self
            .sql
            .query(
                "SELECT data FROM recipes WHERE user_id = ?1 \
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(row_to_recipe)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListResult { items, total })
    }

    /// Random recipe suggestions ("what should I cook today?").
    pub fn random_recipes(&self, query: &RandomQuery) -> Result<Vec<Recipe>, RecipeError> {
        let mut where_clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();
        let mut idx = 1;

        if let Some(ref d) = query.difficulty {
            where_clauses.push(format!("difficulty = ?{idx}"));
            params.push(Value::Text(d.clone()));
            idx += 1;
        }
        if let Some(ref c) = query.cuisine_type {
            where_clauses.push(format!("cuisine_type = ?{idx}"));
            params.push(Value::Text(c.clone()));
            idx += 1;
        }
        if let Some(max) = query.max_prep_time {
            where_clauses.push(format!("prep_time <= ?{idx}"));
            params.push(Value::Integer(max));
            idx += 1;
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!("SELECT data FROM recipes {where_sql} ORDER BY RANDOM() LIMIT ?{idx}");
        params.push(Value::Integer(query.count as i64));

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        rows.iter().map(row_to_recipe).collect()
    }

    /// Update a recipe. Only the owner may edit; anyone else sees the
    /// same response as for a missing recipe.
    pub fn update_recipe(
        &self,
        id: &str,
        user_id: &str,
        update: UpdateRecipeRequest,
    ) -> Result<Recipe, RecipeError> {
        let mut recipe = self.get_owned(id, user_id, "edit")?;

        if let Some(title) = update.title {
            recipe.title = title;
        }
        if let Some(description) = update.description {
            recipe.description = description;
        }
        if let Some(difficulty) = update.difficulty {
            recipe.difficulty = difficulty;
        }
        if let Some(prep_time) = update.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(cook_time) = update.cook_time {
            recipe.cook_time = cook_time;
        }
        if let Some(servings) = update.servings {
            recipe.servings = servings;
        }
        if let Some(cuisine_type) = update.cuisine_type {
            recipe.cuisine_type = cuisine_type;
        }
        if let Some(categories) = update.categories {
            recipe.categories = categories;
        }
        if let Some(calories) = update.calories_per_serving {
            recipe.calories_per_serving = Some(calories);
        }
        if let Some(nutrition) = update.nutrition_info {
            recipe.nutrition_info = Some(nutrition);
        }
        if let Some(ingredients) = update.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = update.instructions {
            recipe.instructions = instructions;
        }
        if let Some(images) = update.images {
            recipe.images = images;
        }

        recipe.updated_at = now_rfc3339();
        self.persist_recipe(&recipe)?;
        Ok(recipe)
    }

    /// Delete a recipe. Owner only; likes, views, comments, and progress
    /// rows go with it via the schema's cascades.
    pub fn delete_recipe(&self, id: &str, user_id: &str) -> Result<(), RecipeError> {
        self.get_owned(id, user_id, "delete")?;

        self.sql
            .exec(
                "DELETE FROM recipes WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        tracing::info!(recipe_id = %id, user_id = %user_id, "deleted recipe");
        Ok(())
    }

    /// Fetch a recipe the user owns, or a not-found error that does not
    /// reveal whether the recipe exists.
    fn get_owned(&self, id: &str, user_id: &str, action: &str) -> Result<Recipe, RecipeError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM recipes WHERE id = ?1 AND user_id = ?2",
                &[Value::Text(id.to_string()), Value::Text(user_id.to_string())],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        let row = rows.first().ok_or_else(|| {
            RecipeError::NotFound(format!(
                "Recipe not found or you do not have permission to {action} it"
            ))
        })?;
        row_to_recipe(row)
    }

    /// Rewrite a recipe's data JSON and every indexed column.
    pub(crate) fn persist_recipe(&self, recipe: &Recipe) -> Result<(), RecipeError> {
        let data =
            serde_json::to_string(recipe).map_err(|e| RecipeError::Internal(e.to_string()))?;
        let categories = serde_json::to_string(&recipe.categories)
            .map_err(|e| RecipeError::Internal(e.to_string()))?;

        let affected = self
            .sql
            .exec(
                "UPDATE recipes SET title = ?1, description = ?2, difficulty = ?3, \
                 cuisine_type = ?4, categories = ?5, prep_time = ?6, likes_count = ?7, \
                 comments_count = ?8, views_count = ?9, trending_score = ?10, data = ?11, \
                 updated_at = ?12 WHERE id = ?13",
                &[
                    Value::Text(recipe.title.clone()),
                    Value::Text(recipe.description.clone()),
                    Value::Text(recipe.difficulty.as_str().to_string()),
                    Value::Text(recipe.cuisine_type.clone()),
                    Value::Text(categories),
                    Value::Integer(recipe.prep_time),
                    Value::Integer(recipe.likes_count),
                    Value::Integer(recipe.comments_count),
                    Value::Integer(recipe.views_count),
                    Value::Real(recipe.trending_score),
                    Value::Text(data),
                    Value::Text(recipe.updated_at.clone()),
                    Value::Text(recipe.id.clone()),
                ],
            )
            .map_err(|e| RecipeError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(RecipeError::NotFound("Recipe not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::service::test_support::{create_req, test_service};

    fn identity(name: &str) -> Identity {
        Identity {
            user_id: format!("id-{name}"),
            email: format!("{name}@example.com"),
            username: name.into(),
        }
    }

    #[test]
    fn create_and_get() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Menemen")).unwrap();

        assert_eq!(recipe.user.username, "alice");
        assert_eq!(recipe.likes_count, 0);
        assert_eq!(recipe.trending_score, 0.0);

        let got = svc.get_recipe(&recipe.id).unwrap();
        assert_eq!(got.title, "Menemen");
    }

    #[test]
    fn create_requires_content() {
        let (svc, _) = test_service();

        let mut no_title = create_req("x");
        no_title.title = "  ".into();
        assert!(matches!(
            svc.create_recipe(&identity("a"), no_title),
            Err(RecipeError::Validation(_))
        ));

        let mut no_ingredients = create_req("Soup");
        no_ingredients.ingredients.clear();
        assert!(matches!(
            svc.create_recipe(&identity("a"), no_ingredients),
            Err(RecipeError::Validation(_))
        ));
    }

    #[test]
    fn list_with_filters() {
        let (svc, _) = test_service();
        let alice = identity("alice");

        let mut soup = create_req("Lentil Soup");
        soup.categories = vec!["soup".into()];
        svc.create_recipe(&alice, soup).unwrap();

        let mut kebab = create_req("Adana Kebab");
        kebab.difficulty = Difficulty::Hard;
        kebab.categories = vec!["grill".into()];
        svc.create_recipe(&alice, kebab).unwrap();

        let all = svc.list_recipes(&RecipeListQuery::default()).unwrap();
        assert_eq!(all.total, 2);

        let hard = svc
            .list_recipes(&RecipeListQuery {
                difficulty: Some("hard".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hard.total, 1);
        assert_eq!(hard.items[0].title, "Adana Kebab");

        let by_category = svc
            .list_recipes(&RecipeListQuery {
                category: Some("soup".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_category.total, 1);

        let searched = svc
            .list_recipes(&RecipeListQuery {
                search: Some("lentil".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(searched.total, 1);
        assert_eq!(searched.items[0].title, "Lentil Soup");
    }

    #[test]
    fn user_recipes_scoped_to_owner() {
        let (svc, _) = test_service();
        svc.create_recipe(&identity("alice"), create_req("A")).unwrap();
        svc.create_recipe(&identity("bob"), create_req("B")).unwrap();

        let mine = svc.user_recipes("id-alice", &ListParams::default()).unwrap();
        assert_eq!(mine.total, 1);
        assert_eq!(mine.items[0].title, "A");
    }

    #[test]
    fn random_respects_count_and_filters() {
        let (svc, _) = test_service();
        let alice = identity("alice");
        for i in 0..6 {
            let mut req = create_req(&format!("Dish {i}"));
            req.prep_time = 10 * (i + 1);
            svc.create_recipe(&alice, req).unwrap();
        }

        let picks = svc.random_recipes(&RandomQuery::default()).unwrap();
        assert_eq!(picks.len(), 5);

        let quick = svc
            .random_recipes(&RandomQuery {
                count: 10,
                max_prep_time: Some(20),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(quick.len(), 2);
        assert!(quick.iter().all(|r| r.prep_time <= 20));
    }

    #[test]
    fn update_owner_only() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Pilav")).unwrap();

        let updated = svc
            .update_recipe(
                &recipe.id,
                "id-alice",
                UpdateRecipeRequest {
                    title: Some("Bulgur Pilav".into()),
                    servings: Some(6),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Bulgur Pilav");
        assert_eq!(updated.servings, 6);
        // Untouched fields survive.
        assert_eq!(updated.cuisine_type, "turkish");

        let denied = svc.update_recipe(
            &recipe.id,
            "id-bob",
            UpdateRecipeRequest {
                title: Some("Stolen".into()),
                ..Default::default()
            },
        );
        assert!(matches!(denied, Err(RecipeError::NotFound(_))));
    }

    #[test]
    fn delete_owner_only() {
        let (svc, _) = test_service();
        let recipe = svc.create_recipe(&identity("alice"), create_req("Borek")).unwrap();

        assert!(matches!(
            svc.delete_recipe(&recipe.id, "id-bob"),
            Err(RecipeError::NotFound(_))
        ));

        svc.delete_recipe(&recipe.id, "id-alice").unwrap();
        assert!(svc.get_recipe(&recipe.id).is_err());
    }
}
