pub mod admin;
pub mod comments;
pub mod likes;
pub mod views;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Error envelope shared by the JSON endpoints.
pub(crate) fn fail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "message": message })))
}
