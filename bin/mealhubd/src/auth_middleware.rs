//! JWT authentication middleware.
//!
//! Extracts the bearer token from `Authorization: Bearer <token>`,
//! validates it, and injects a verified [`Identity`] into request
//! extensions for the module handlers.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use mealhub_core::error::error_code;
use mealhub_core::{Identity, envelope};

/// JWT claims payload — mirrors auth::model::Claims but lives here
/// because mealhubd is the binary that validates tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, msg) = match self {
            AuthError::MissingToken => {
                (error_code::UNAUTHENTICATED, "Access token is required".to_string())
            }
            AuthError::InvalidToken(e) => {
                (error_code::TOKEN_INVALID, format!("Invalid or expired token: {e}"))
            }
        };
        let body = envelope::error_body(code, &msg);
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Middleware that validates the bearer token and stores the verified
/// identity in request extensions.
///
/// Public paths pass through untouched. Optional-auth paths (the public
/// recipe reads) pass through too, but gain an `Identity` when a valid
/// token is present. Everything else requires a valid token.
pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let identity = match extract_bearer(request.headers()) {
        Some(token) => Some(decode_identity(&jwt_state, token)?),
        None => None,
    };

    if is_public_path(&path) || is_optional_auth(&method, &path) {
        if let Some(identity) = identity {
            request.extensions_mut().insert(identity);
        }
        return Ok(next.run(request).await);
    }

    let identity = identity.ok_or(AuthError::MissingToken)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn decode_identity(jwt_state: &JwtState, token: &str) -> Result<Identity, AuthError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &jwt_state.decoding_key,
        &jwt_state.validation,
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let claims = token_data.claims;
    Ok(Identity {
        user_id: claims.sub,
        email: claims.email,
        username: claims.username,
    })
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Paths that never require authentication.
fn is_public_path(path: &str) -> bool {
    matches!(path, "/" | "/health" | "/version")
        || path.starts_with("/auth/register")
        || path.starts_with("/auth/login")
}

/// Recipe reads are browsable without an account; a valid token only
/// personalizes the response.
fn is_optional_auth(method: &Method, path: &str) -> bool {
    method == Method::GET && path.starts_with("/recipes") && path != "/recipes/user/me"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/version"));
        assert!(is_public_path("/auth/login"));
        assert!(is_public_path("/auth/register"));
        assert!(!is_public_path("/auth/me"));
        assert!(!is_public_path("/families/my-families"));
    }

    #[test]
    fn optional_auth_paths() {
        assert!(is_optional_auth(&Method::GET, "/recipes"));
        assert!(is_optional_auth(&Method::GET, "/recipes/abc123"));
        assert!(is_optional_auth(&Method::GET, "/recipes/trending"));
        assert!(is_optional_auth(&Method::GET, "/recipes/abc123/comments"));
        // Writes and the caller-scoped listing still need a token.
        assert!(!is_optional_auth(&Method::POST, "/recipes"));
        assert!(!is_optional_auth(&Method::GET, "/recipes/user/me"));
        assert!(!is_optional_auth(&Method::POST, "/recipes/abc123/like"));
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = axum::http::HeaderMap::new();
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        headers.insert("authorization", "Basic dXNlcg==".parse().unwrap());
        assert!(extract_bearer(&headers).is_none());
    }
}
