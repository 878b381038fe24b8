use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use mealhub_core::{new_id, now_rfc3339};
use mealhub_sql::{Row, Value};

use crate::model::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Register a new user and issue a token.
    pub fn register(&self, input: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_string();

        if email.is_empty() || username.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "email, username, and password are required".into(),
            ));
        }
        if !is_valid_email(&email) {
            return Err(AuthError::Validation("invalid email format".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation(
                "password must be at least 8 characters long".into(),
            ));
        }

        if self.find_by_email_or_username(Some(&email), Some(&username))?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = hash_password(&input.password)?;

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            email,
            username,
            profile_image: input.profile_image,
            bio: input.bio,
            preferences: input.preferences,
            total_points: 0,
            daily_calories: 0,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let data = serde_json::to_string(&user).map_err(|e| AuthError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO users (id, email, username, password_hash, daily_calories, data, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
                &[
                    Value::Text(user.id.clone()),
                    Value::Text(user.email.clone()),
                    Value::Text(user.username.clone()),
                    Value::Text(password_hash),
                    Value::Text(data),
                    Value::Text(now.clone()),
                    Value::Text(now),
                ],
            )
            .map_err(|e| {
                // A concurrent register can slip past the pre-check; the
                // UNIQUE constraints are the real guard.
                if e.is_unique_violation() {
                    AuthError::AlreadyExists
                } else {
                    AuthError::Storage(e.to_string())
                }
            })?;

        tracing::info!(user_id = %user.id, "registered user");

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Verify credentials and issue a token.
    pub fn login(&self, input: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }

        let rows = self
            .sql
            .query(
                "SELECT data, password_hash FROM users WHERE email = ?1",
                &[Value::Text(email)],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        // Same error whether the account is missing or the password is
        // wrong, so login attempts can't probe for registered emails.
        let row = rows.first().ok_or(AuthError::InvalidCredentials)?;
        let hash = row
            .get_str("password_hash")
            .ok_or_else(|| AuthError::Internal("missing password_hash column".into()))?;

        if !verify_password(&input.password, hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let user = row_to_user(row)?;
        let token = self.issue_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let row = rows.first().ok_or(AuthError::UserNotFound)?;
        row_to_user(row)
    }

    /// Find a user by email or username (email takes precedence).
    pub fn find_by_email_or_username(
        &self,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        let rows = match (email, username) {
            (Some(e), Some(u)) => self.sql.query(
                "SELECT data FROM users WHERE email = ?1 OR username = ?2",
                &[Value::Text(e.to_string()), Value::Text(u.to_string())],
            ),
            (Some(e), None) => self.sql.query(
                "SELECT data FROM users WHERE email = ?1",
                &[Value::Text(e.to_string())],
            ),
            (None, Some(u)) => self.sql.query(
                "SELECT data FROM users WHERE username = ?1",
                &[Value::Text(u.to_string())],
            ),
            (None, None) => return Ok(None),
        }
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        rows.first().map(row_to_user).transpose()
    }

    /// Current daily-calorie total for a user.
    pub fn daily_calories(&self, user_id: &str) -> Result<i64, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT daily_calories FROM users WHERE id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        rows.first()
            .and_then(|r| r.get_i64("daily_calories"))
            .ok_or(AuthError::UserNotFound)
    }

    /// Add calories to the user's daily total. Returns the new total.
    pub fn add_calories(&self, user_id: &str, calories: i64) -> Result<i64, AuthError> {
        if calories <= 0 {
            return Err(AuthError::Validation(
                "valid calories amount is required".into(),
            ));
        }

        let mut user = self.get_user(user_id)?;
        user.daily_calories += calories;
        self.persist_user(&user)?;
        Ok(user.daily_calories)
    }

    /// Reset the user's daily-calorie total to zero.
    pub fn reset_calories(&self, user_id: &str) -> Result<(), AuthError> {
        let mut user = self.get_user(user_id)?;
        user.daily_calories = 0;
        self.persist_user(&user)
    }

    /// Rewrite a user's data JSON and indexed columns.
    fn persist_user(&self, user: &User) -> Result<(), AuthError> {
        let mut user = user.clone();
        user.updated_at = now_rfc3339();

        let data = serde_json::to_string(&user).map_err(|e| AuthError::Internal(e.to_string()))?;

        let affected = self
            .sql
            .exec(
                "UPDATE users SET data = ?1, daily_calories = ?2, updated_at = ?3 WHERE id = ?4",
                &[
                    Value::Text(data),
                    Value::Integer(user.daily_calories),
                    Value::Text(user.updated_at.clone()),
                    Value::Text(user.id.clone()),
                ],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

/// Deserialize a User from a row's `data` JSON column.
fn row_to_user(row: &Row) -> Result<User, AuthError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
    serde_json::from_str(json).map_err(|e| AuthError::Internal(format!("bad user json: {e}")))
}

/// Hash a password with argon2id and a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password attempt against a stored argon2id hash.
fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Minimal shape check: one `@`, non-empty local part, dot in the domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{register_req, test_service};

    #[test]
    fn register_and_login() {
        let svc = test_service();

        let reg = svc.register(register_req("alice@example.com", "alice")).unwrap();
        assert_eq!(reg.user.email, "alice@example.com");
        assert!(!reg.token.is_empty());

        let login = svc
            .login(LoginRequest {
                email: "alice@example.com".into(),
                password: "secret-password".into(),
            })
            .unwrap();
        assert_eq!(login.user.id, reg.user.id);
    }

    #[test]
    fn register_normalizes_email_case() {
        let svc = test_service();
        svc.register(register_req("Bob@Example.COM", "bob")).unwrap();

        let login = svc.login(LoginRequest {
            email: "bob@example.com".into(),
            password: "secret-password".into(),
        });
        assert!(login.is_ok());
    }

    #[test]
    fn duplicate_email_or_username_rejected() {
        let svc = test_service();
        svc.register(register_req("carol@example.com", "carol")).unwrap();

        let dup_email = svc.register(register_req("carol@example.com", "carol2"));
        assert!(matches!(dup_email, Err(AuthError::AlreadyExists)));

        let dup_username = svc.register(register_req("carol2@example.com", "carol"));
        assert!(matches!(dup_username, Err(AuthError::AlreadyExists)));
    }

    #[test]
    fn register_validation() {
        let svc = test_service();

        let mut bad_email = register_req("not-an-email", "dave");
        bad_email.password = "long-enough".into();
        assert!(matches!(svc.register(bad_email), Err(AuthError::Validation(_))));

        let mut short_pw = register_req("dave@example.com", "dave");
        short_pw.password = "short".into();
        assert!(matches!(svc.register(short_pw), Err(AuthError::Validation(_))));
    }

    #[test]
    fn login_wrong_password() {
        let svc = test_service();
        svc.register(register_req("erin@example.com", "erin")).unwrap();

        let result = svc.login(LoginRequest {
            email: "erin@example.com".into(),
            password: "wrong-password".into(),
        });
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn login_unknown_email_same_error() {
        let svc = test_service();
        let result = svc.login(LoginRequest {
            email: "ghost@example.com".into(),
            password: "whatever-long".into(),
        });
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn calorie_tracking() {
        let svc = test_service();
        let reg = svc.register(register_req("finn@example.com", "finn")).unwrap();

        assert_eq!(svc.daily_calories(&reg.user.id).unwrap(), 0);

        assert_eq!(svc.add_calories(&reg.user.id, 350).unwrap(), 350);
        assert_eq!(svc.add_calories(&reg.user.id, 200).unwrap(), 550);
        assert_eq!(svc.daily_calories(&reg.user.id).unwrap(), 550);

        // The data JSON stays in sync with the column.
        assert_eq!(svc.get_user(&reg.user.id).unwrap().daily_calories, 550);

        svc.reset_calories(&reg.user.id).unwrap();
        assert_eq!(svc.daily_calories(&reg.user.id).unwrap(), 0);
    }

    #[test]
    fn add_calories_rejects_non_positive() {
        let svc = test_service();
        let reg = svc.register(register_req("gus@example.com", "gus")).unwrap();

        assert!(matches!(
            svc.add_calories(&reg.user.id, 0),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            svc.add_calories(&reg.user.id, -10),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("missing-at.example.com"));
        assert!(!is_valid_email("@no-local.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.leading-dot.com"));
        assert!(!is_valid_email("spaced user@example.com"));
    }
}
