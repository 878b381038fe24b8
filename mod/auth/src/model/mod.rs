use serde::{Deserialize, Serialize};

/// A registered user. The password hash never leaves the `users` table
/// and is deliberately absent from this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    pub email: String,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Free-form preference payload (dietary restrictions, favorite
    /// categories, skill level...). Stored as given at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,

    /// Gamification points. Unused by any current operation but part of
    /// the stored profile the client renders.
    #[serde(default)]
    pub total_points: i64,

    /// Running total of calories eaten today, credited by the cooking
    /// flow and the explicit add-calories action.
    #[serde(default)]
    pub daily_calories: i64,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Cooking preferences captured at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub favorite_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_skill_level: Option<String>,
    #[serde(default)]
    pub preferred_meal_times: Vec<String>,
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// JWT claims payload. `sub` is the user id; email and username ride
/// along so downstream modules get the full verified identity without a
/// database round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Successful register/login payload: the user plus a signed token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Body for `POST /auth/add-calories`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCaloriesRequest {
    pub calories: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_uses_camel_case() {
        let user = User {
            id: "u1".into(),
            email: "a@example.com".into(),
            username: "alice".into(),
            profile_image: None,
            bio: Some("cook".into()),
            preferences: None,
            total_points: 10,
            daily_calories: 450,
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"dailyCalories\":450"));
        assert!(json.contains("\"totalPoints\":10"));
        // Optional None fields should not appear in JSON.
        assert!(!json.contains("profileImage"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn register_request_deserialize() {
        let json = r#"{
            "email": "a@example.com",
            "username": "alice",
            "password": "secret123",
            "preferences": {"dietaryRestrictions": ["vegan"]}
        }"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.username, "alice");
        let prefs = req.preferences.unwrap();
        assert_eq!(prefs.dietary_restrictions, vec!["vegan"]);
        assert!(prefs.cooking_skill_level.is_none());
    }

    #[test]
    fn claims_roundtrip() {
        let claims = Claims {
            sub: "u1".into(),
            email: "a@example.com".into(),
            username: "alice".into(),
            iat: 1_700_000_000,
            exp: 1_700_604_800,
        };
        let json = serde_json::to_string(&claims).unwrap();
        let back: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sub, "u1");
        assert_eq!(back.exp, 1_700_604_800);
    }
}
