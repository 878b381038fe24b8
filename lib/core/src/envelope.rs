//! The JSON response envelope every endpoint speaks.
//!
//! Success: `{"success": true, "data": ..., "message": "..."}` (message
//! optional). Failure: `{"success": false, "error": {"message": "...",
//! "code": "..."}}`. The mobile client switches on `success` and matches
//! error handling on `error.code`.

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Successful response wrapping a data payload.
pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
    }))
}

/// Successful response with a data payload and a human-readable message.
pub fn ok_with_message<T: Serialize>(data: T, message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": message,
    }))
}

/// Successful response carrying only a message (deletes, resets).
pub fn message(message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
    }))
}

/// Failure body for the given stable code and message.
///
/// Error types build their HTTP response from this; the status code is
/// chosen by the caller.
pub fn error_body(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "error": {
            "message": message,
            "code": code,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_shape() {
        let Json(body) = ok(json!({"id": "abc"}));
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "abc");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn ok_with_message_shape() {
        let Json(body) = ok_with_message(json!([1, 2]), "listed");
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "listed");
    }

    #[test]
    fn error_shape() {
        let body = error_body("NOT_A_MEMBER", "you are not a member of this family");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_A_MEMBER");
        assert_eq!(body["error"]["message"], "you are not a member of this family");
        assert!(body.get("data").is_none());
    }
}
