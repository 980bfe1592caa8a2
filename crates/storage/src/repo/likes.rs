use crate::Db;
use chrono::Utc;

impl Db {
    /// Flips the (comment, device) like row inside one transaction and
    /// returns `(likes, is_liked)` after the flip. `None` when the comment
    /// does not exist.
    pub async fn toggle_like(
        &self,
        comment_id: &str,
        device_id: &str,
    ) -> anyhow::Result<Option<(i64, bool)>> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = ?)")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Ok(None);
        }

        let already_liked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comment_likes WHERE comment_id = ? AND device_id = ?)",
        )
        .bind(comment_id)
        .bind(device_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_liked {
            sqlx::query("DELETE FROM comment_likes WHERE comment_id = ? AND device_id = ?")
                .bind(comment_id)
                .bind(device_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                "INSERT INTO comment_likes (comment_id, device_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(comment_id)
            .bind(device_id)
            .bind(Utc::now().naive_utc())
            .execute(&mut *tx)
            .await?;
        }

        let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((likes, !already_liked)))
    }
}
