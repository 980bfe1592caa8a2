use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::{CommentRecord, CommentType, PageId};
use serde::Deserialize;
use serde_json::{json, Value};
use storage::NewComment;
use uuid::Uuid;

use super::fail;
use crate::render::render_comment;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub identifier: String,
    pub comment_type: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub nickname: String,
    pub email: String,
    pub website: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub identifier: String,
    pub comment_type: Option<String>,
    pub content: String,
    pub parent_id: Option<String>,
    pub user_info: Option<UserInfo>,
}

fn parse_comment_type(raw: Option<&str>) -> Result<CommentType, (StatusCode, Json<Value>)> {
    match raw {
        None => Ok(CommentType::Blog),
        Some(s) => s
            .parse()
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Invalid commentType")),
    }
}

pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CommentRecord>>, (StatusCode, Json<Value>)> {
    let identifier = PageId::new(&query.identifier)
        .map_err(|e| fail(StatusCode::BAD_REQUEST, &e))?;
    let comment_type = parse_comment_type(query.comment_type.as_deref())?;

    let comments = state
        .db
        .list_comments(
            identifier.as_str(),
            comment_type,
            query.device_id.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to list comments");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch comments")
        })?;

    Ok(Json(comments))
}

pub async fn post_comment(
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let identifier = PageId::new(&payload.identifier)
        .map_err(|e| fail(StatusCode::BAD_REQUEST, &e))?;
    let comment_type = parse_comment_type(payload.comment_type.as_deref())?;

    if payload.content.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Comment content is required"));
    }

    let user = payload
        .user_info
        .filter(|u| !u.nickname.trim().is_empty() && !u.email.trim().is_empty())
        .ok_or_else(|| fail(StatusCode::BAD_REQUEST, "Nickname and email are required"))?;

    let comment = NewComment {
        id: Uuid::new_v4().to_string(),
        identifier: identifier.clone(),
        comment_type,
        // Accepted as given; a parent deleted later degrades to a root
        // when the client rebuilds the thread.
        parent_id: payload.parent_id.filter(|p| !p.is_empty()),
        nickname: user.nickname,
        email: user.email,
        website: user.website,
        avatar: user.avatar,
        is_admin: false,
        content: render_comment(&payload.content),
        created_at: Utc::now().naive_utc(),
    };

    state.db.insert_comment(&comment).await.map_err(|e| {
        tracing::error!(error = %e, "failed to store comment");
        fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store comment")
    })?;

    let stored = CommentRecord {
        id: comment.id,
        parent_id: comment.parent_id,
        nickname: comment.nickname,
        email: comment.email,
        website: comment.website,
        avatar: comment.avatar,
        is_admin: comment.is_admin,
        content: comment.content,
        created_at: comment.created_at,
        likes: 0,
        is_liked: false,
        identifier,
        comment_type,
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "comment": stored })),
    ))
}
