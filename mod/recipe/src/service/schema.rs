use mealhub_sql::SQLStore;

use crate::service::RecipeError;

/// Initialize the SQLite schema for the recipe module.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), RecipeError> {
    let statements = [
        // Recipes: full document in `data`, filter/sort columns indexed.
        "CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            difficulty TEXT NOT NULL,
            cuisine_type TEXT NOT NULL,
            categories TEXT NOT NULL,
            prep_time INTEGER NOT NULL,
            likes_count INTEGER NOT NULL DEFAULT 0,
            comments_count INTEGER NOT NULL DEFAULT 0,
            views_count INTEGER NOT NULL DEFAULT 0,
            trending_score REAL NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_recipes_user ON recipes(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_recipes_trending ON recipes(trending_score)",
        "CREATE INDEX IF NOT EXISTS idx_recipes_created ON recipes(created_at)",

        // One like per user per recipe; the composite key is the guard.
        "CREATE TABLE IF NOT EXISTS recipe_likes (
            user_id TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, recipe_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_recipe_likes_recipe ON recipe_likes(recipe_id)",

        // First view per user per recipe; repeats are ignored.
        "CREATE TABLE IF NOT EXISTS recipe_views (
            user_id TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, recipe_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_recipe_views_recipe ON recipe_views(recipe_id)",

        "CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            recipe_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_comments_recipe ON comments(recipe_id)",
        "CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id)",

        // Cooking progress, one row per (user, recipe).
        "CREATE TABLE IF NOT EXISTS user_progress (
            user_id TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            completion_status TEXT NOT NULL,
            did_eat INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, recipe_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_user_progress_user ON user_progress(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| RecipeError::Storage(e.to_string()))?;
    }

    Ok(())
}
