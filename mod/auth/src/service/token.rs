use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use mealhub_core::Identity;

use crate::model::{Claims, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Sign a JWT for a user.
    ///
    /// Tokens are stateless: there is no session record and no revocation,
    /// only the `exp` claim. The mobile client re-logs-in on expiry.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.config.token_ttl,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("JWT encode failed: {e}")))
    }

    /// Verify and decode a JWT.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::TokenInvalid(e.to_string()))?;

        Ok(token_data.claims)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
        }
    }
}
