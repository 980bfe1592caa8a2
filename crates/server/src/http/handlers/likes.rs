use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::fail;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub comment_id: String,
    pub device_id: String,
}

/// Per-comment, per-device like toggle.
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Json(payload): Json<ToggleLikeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if payload.comment_id.is_empty() || payload.device_id.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Missing commentId or deviceId"));
    }

    let outcome = state
        .db
        .toggle_like(&payload.comment_id, &payload.device_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to toggle like");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to toggle like")
        })?;

    match outcome {
        Some((likes, is_liked)) => Ok(Json(json!({
            "success": true,
            "likes": likes,
            "isLiked": is_liked,
        }))),
        None => Err(fail(StatusCode::NOT_FOUND, "Comment not found")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLikesQuery {
    pub post_id: String,
}

pub async fn get_post_likes(
    State(state): State<AppState>,
    Query(query): Query<PostLikesQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let likes = state.db.get_post_likes(&query.post_id).await.map_err(|e| {
        tracing::error!(error = %e, "failed to read post likes");
        fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read likes")
    })?;

    Ok(Json(json!({ "likeCount": likes })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustLikesRequest {
    pub post_id: String,
    pub delta: i64,
}

/// Whole-post like counter, moved by `delta` and clamped at zero.
pub async fn adjust_post_likes(
    State(state): State<AppState>,
    Json(payload): Json<AdjustLikesRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if payload.post_id.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Missing postId"));
    }

    let likes = state
        .db
        .adjust_post_likes(&payload.post_id, payload.delta)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to adjust post likes");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to adjust likes")
        })?;

    Ok(Json(json!({ "success": true, "likeCount": likes })))
}
