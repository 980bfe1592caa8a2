use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::fail;
use crate::state::AppState;

fn authorize(headers: &HeaderMap, admin_token: &str) -> Result<(), (StatusCode, Json<Value>)> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

    let expected = format!("Bearer {}", admin_token);
    if auth_header != expected {
        return Err(fail(StatusCode::FORBIDDEN, "Invalid Admin Token"));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_all_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&headers, &state.admin_token)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let (comments, total) = state.db.list_all_comments(limit, offset).await.map_err(|e| {
        tracing::error!(error = %e, "failed to list all comments");
        fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch comments")
    })?;

    Ok(Json(json!({
        "comments": comments,
        "total": total,
        "page": page,
        "limit": limit,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: String,
}

pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DeleteCommentRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&headers, &state.admin_token)?;

    if payload.comment_id.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Missing commentId"));
    }

    let deleted = state
        .db
        .delete_comment(&payload.comment_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to delete comment");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete comment")
        })?;

    if !deleted {
        return Err(fail(StatusCode::NOT_FOUND, "Comment not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Deleted 1 comment(s).",
    })))
}
