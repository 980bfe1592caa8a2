use crate::{models::SqlComment, Db};
use chrono::NaiveDateTime;
use domain::{CommentRecord, CommentType, PageId};

/// Comment as accepted for insertion; `likes`/`is_liked` are derived state
/// and never written directly.
pub struct NewComment {
    pub id: String,
    pub identifier: PageId,
    pub comment_type: CommentType,
    pub parent_id: Option<String>,
    pub nickname: String,
    pub email: String,
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub content: String,
    pub created_at: NaiveDateTime,
}

const SELECT_WITH_LIKES: &str = r#"
    SELECT
        c.id, c.identifier, c.comment_type, c.parent_id,
        c.nickname, c.email, c.website, c.avatar, c.is_admin,
        c.content, c.created_at,
        (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.id) AS likes,
        EXISTS(
            SELECT 1 FROM comment_likes l
            WHERE l.comment_id = c.id AND l.device_id = ?
        ) AS is_liked
    FROM comments c
"#;

impl Db {
    pub async fn insert_comment(&self, c: &NewComment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, identifier, comment_type, parent_id,
                nickname, email, website, avatar, is_admin,
                content, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&c.id)
        .bind(c.identifier.as_str())
        .bind(c.comment_type.as_str())
        .bind(&c.parent_id)
        .bind(&c.nickname)
        .bind(&c.email)
        .bind(&c.website)
        .bind(&c.avatar)
        .bind(c.is_admin)
        .bind(&c.content)
        .bind(c.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All comments on one page, oldest first, with like aggregates computed
    /// for the requesting device. An unknown/absent device simply sees
    /// `is_liked = false` everywhere.
    pub async fn list_comments(
        &self,
        identifier: &str,
        comment_type: CommentType,
        device_id: Option<&str>,
    ) -> anyhow::Result<Vec<CommentRecord>> {
        let sql = format!(
            "{} WHERE c.identifier = ? AND c.comment_type = ? ORDER BY c.created_at ASC",
            SELECT_WITH_LIKES
        );
        let rows = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(device_id.unwrap_or(""))
            .bind(identifier)
            .bind(comment_type.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Admin listing across all pages, newest first.
    pub async fn list_all_comments(
        &self,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<CommentRecord>, i64)> {
        let sql = format!(
            "{} ORDER BY c.created_at DESC LIMIT ? OFFSET ?",
            SELECT_WITH_LIKES
        );
        let rows = sqlx::query_as::<_, SqlComment>(&sql)
            .bind("")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Hard delete; like rows go with the comment. Replies keep their
    /// dangling parent_id and surface as roots on the next thread build.
    pub async fn delete_comment(&self, comment_id: &str) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comment_likes WHERE comment_id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        if deleted > 0 {
            tracing::debug!(comment_id, "comment and its like rows deleted");
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Db {
        Db::new("sqlite::memory:").await.unwrap()
    }

    fn comment(id: &str, parent: Option<&str>, secs: i64) -> NewComment {
        NewComment {
            id: id.to_string(),
            identifier: PageId::new_unchecked("post-1".to_string()),
            comment_type: CommentType::Blog,
            parent_id: parent.map(str::to_string),
            nickname: "Ferris".to_string(),
            email: "f@example.com".to_string(),
            website: None,
            avatar: None,
            is_admin: false,
            content: "<p>hi</p>".to_string(),
            created_at: chrono::DateTime::from_timestamp(secs, 0).unwrap().naive_utc(),
        }
    }

    #[tokio::test]
    async fn list_is_scoped_and_ordered() {
        let db = db().await;
        db.insert_comment(&comment("b", None, 20)).await.unwrap();
        db.insert_comment(&comment("a", None, 10)).await.unwrap();

        let mut other = comment("x", None, 5);
        other.identifier = PageId::new_unchecked("post-2".to_string());
        db.insert_comment(&other).await.unwrap();

        let list = db
            .list_comments("post-1", CommentType::Blog, None)
            .await
            .unwrap();
        let ids: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn delete_removes_comment_and_likes() {
        let db = db().await;
        db.insert_comment(&comment("a", None, 10)).await.unwrap();
        db.toggle_like("a", "device-1").await.unwrap();

        assert!(db.delete_comment("a").await.unwrap());
        assert!(!db.delete_comment("a").await.unwrap());

        let list = db
            .list_comments("post-1", CommentType::Blog, Some("device-1"))
            .await
            .unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn like_aggregates_are_per_device() {
        let db = db().await;
        db.insert_comment(&comment("a", None, 10)).await.unwrap();
        db.toggle_like("a", "device-1").await.unwrap();
        db.toggle_like("a", "device-2").await.unwrap();

        let for_liker = db
            .list_comments("post-1", CommentType::Blog, Some("device-1"))
            .await
            .unwrap();
        assert_eq!(for_liker[0].likes, 2);
        assert!(for_liker[0].is_liked);

        let for_stranger = db
            .list_comments("post-1", CommentType::Blog, Some("device-9"))
            .await
            .unwrap();
        assert_eq!(for_stranger[0].likes, 2);
        assert!(!for_stranger[0].is_liked);
    }
}
