use chrono::NaiveDateTime;
use domain::{CommentRecord, CommentType, PageId};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub identifier: String,
    pub comment_type: String,
    pub parent_id: Option<String>,
    pub nickname: String,
    pub email: String,
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub content: String,
    pub created_at: NaiveDateTime,

    // Aggregated per query against comment_likes.
    pub likes: i64,
    pub is_liked: bool,
}

impl From<SqlComment> for CommentRecord {
    fn from(sql: SqlComment) -> Self {
        CommentRecord {
            id: sql.id,
            parent_id: sql.parent_id,
            nickname: sql.nickname,
            email: sql.email,
            website: sql.website,
            avatar: sql.avatar,
            is_admin: sql.is_admin,
            content: sql.content,
            created_at: sql.created_at,
            likes: sql.likes,
            is_liked: sql.is_liked,
            identifier: PageId::new_unchecked(sql.identifier),
            // Stored values only ever come from CommentType::as_str.
            comment_type: sql.comment_type.parse().unwrap_or(CommentType::Blog),
        }
    }
}
