use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Cooking difficulty of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Recipe — the core data model
// ---------------------------------------------------------------------------

/// Author snapshot embedded in recipes and comments.
///
/// Usernames are immutable (there is no profile-update endpoint), so the
/// snapshot taken at write time stays valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// A single ingredient line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

/// A numbered instruction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub step: i64,
    pub description: String,
    /// Minutes, when the step is timed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

/// Per-serving nutrition facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
}

/// A shared recipe.
///
/// `likes_count` / `comments_count` / `views_count` are denormalized from
/// the fact tables and recounted on every interaction; `trending_score`
/// is derived from them by the trending engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,

    /// Owning user, snapshotted at creation.
    pub user: AuthorRef,

    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Minutes.
    pub prep_time: i64,
    /// Minutes.
    pub cook_time: i64,
    pub servings: i64,
    pub cuisine_type: String,
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_per_serving: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<NutritionInfo>,

    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub views_count: i64,
    #[serde(default)]
    pub trending_score: f64,

    /// RFC 3339 timestamps.
    pub created_at: String,
    pub updated_at: String,
}

/// Body for `POST /recipes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub cuisine_type: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub calories_per_serving: Option<i64>,
    #[serde(default)]
    pub nutrition_info: Option<NutritionInfo>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Body for `PUT /recipes/{id}` — only present fields are changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub prep_time: Option<i64>,
    #[serde(default)]
    pub cook_time: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub calories_per_serving: Option<i64>,
    #[serde(default)]
    pub nutrition_info: Option<NutritionInfo>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub instructions: Option<Vec<Instruction>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// Query parameters for `GET /recipes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    /// Single category to filter on.
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive substring match over title and description.
    #[serde(default)]
    pub search: Option<String>,
}

/// Query parameters for `GET /recipes/random`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomQuery {
    #[serde(default = "default_random_count")]
    pub count: usize,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub max_prep_time: Option<i64>,
}

fn default_random_count() -> usize {
    5
}

impl Default for RandomQuery {
    fn default() -> Self {
        Self {
            count: default_random_count(),
            difficulty: None,
            cuisine_type: None,
            max_prep_time: None,
        }
    }
}

/// Result of the like toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: i64,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a recipe, with an optional 1–5 rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub recipe_id: String,
    pub user: AuthorRef,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    pub created_at: String,
}

/// Body for `POST /recipes/{id}/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub rating: Option<i64>,
}

// ---------------------------------------------------------------------------
// UserProgress
// ---------------------------------------------------------------------------

/// Cooking state of a user for one recipe.
///
/// ```text
/// (none) → IN_PROGRESS → COMPLETED
///                      → ABANDONED
/// ```
///
/// `ate-meal` upserts straight to COMPLETED + didEat even when cooking
/// was never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user cooking progress row. Unique per (user, recipe).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub recipe_id: String,
    pub completion_status: CompletionStatus,
    #[serde(default)]
    pub did_eat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub updated_at: String,
}

/// Body for `POST /recipes/{id}/complete-cooking`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCookingRequest {
    #[serde(default)]
    pub did_eat: bool,
    #[serde(default)]
    pub calories_consumed: Option<i64>,
}

/// Body for `POST /recipes/{id}/ate-meal`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AteMealRequest {
    #[serde(default)]
    pub calories_consumed: Option<i64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_roundtrip() {
        for d in &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let json = serde_json::to_string(d).unwrap();
            let back: Difficulty = serde_json::from_str(&json).unwrap();
            assert_eq!(*d, back);
            assert_eq!(Difficulty::from_str(d.as_str()), Some(*d));
        }
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"easy\"");
    }

    #[test]
    fn completion_status_roundtrip() {
        for s in &[
            CompletionStatus::InProgress,
            CompletionStatus::Completed,
            CompletionStatus::Abandoned,
        ] {
            let json = serde_json::to_string(s).unwrap();
            let back: CompletionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*s, back);
            assert_eq!(CompletionStatus::from_str(s.as_str()), Some(*s));
        }
        assert_eq!(
            serde_json::to_string(&CompletionStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn create_request_deserialize() {
        let json = r#"{
            "title": "Lentil Soup",
            "description": "Hearty and cheap",
            "difficulty": "easy",
            "prepTime": 10,
            "cookTime": 30,
            "servings": 4,
            "cuisineType": "turkish",
            "categories": ["soup", "vegan"],
            "ingredients": [{"name": "red lentils", "amount": "2", "unit": "cups"}],
            "instructions": [{"step": 1, "description": "Rinse the lentils"}]
        }"#;
        let req: CreateRecipeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.title, "Lentil Soup");
        assert_eq!(req.difficulty, Difficulty::Easy);
        assert_eq!(req.categories.len(), 2);
        assert!(req.images.is_empty());
        assert!(req.nutrition_info.is_none());
        assert_eq!(req.instructions[0].duration, None);
    }

    #[test]
    fn update_request_partial() {
        let req: UpdateRecipeRequest = serde_json::from_str(r#"{"title": "New name"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("New name"));
        assert!(req.description.is_none());
        assert!(req.ingredients.is_none());
    }

    #[test]
    fn recipe_json_roundtrip() {
        let recipe = Recipe {
            id: "r1".into(),
            user: AuthorRef {
                id: "u1".into(),
                username: "alice".into(),
                profile_image: None,
            },
            title: "Menemen".into(),
            description: "Eggs with tomatoes".into(),
            difficulty: Difficulty::Easy,
            prep_time: 5,
            cook_time: 15,
            servings: 2,
            cuisine_type: "turkish".into(),
            categories: vec!["breakfast".into()],
            calories_per_serving: Some(320),
            nutrition_info: None,
            ingredients: vec![],
            instructions: vec![],
            images: vec![],
            likes_count: 10,
            comments_count: 4,
            views_count: 50,
            trending_score: 55.0,
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_string(&recipe).unwrap();
        assert!(json.contains("\"likesCount\":10"));
        assert!(json.contains("\"trendingScore\":55.0"));
        let back: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "r1");
        assert_eq!(back.user.username, "alice");
        assert_eq!(back.views_count, 50);
    }

    #[test]
    fn random_query_defaults() {
        let q: RandomQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.count, 5);
        assert!(q.max_prep_time.is_none());
    }
}
