use crate::Db;

// Small counter tables backing the views and whole-post like endpoints.
impl Db {
    /// Bumps the per-post view counter and the site-wide daily counter for
    /// `date_key` (caller decides the timezone for the day bucket).
    /// Returns the new `(post_total, daily_total)`.
    pub async fn record_view(&self, slug: &str, date_key: &str) -> anyhow::Result<(i64, i64)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO post_views (slug, views) VALUES (?, 1)
            ON CONFLICT(slug) DO UPDATE SET views = views + 1
            "#,
        )
        .bind(slug)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO daily_views (date, views) VALUES (?, 1)
            ON CONFLICT(date) DO UPDATE SET views = views + 1
            "#,
        )
        .bind(date_key)
        .execute(&mut *tx)
        .await?;

        let post_total: i64 = sqlx::query_scalar("SELECT views FROM post_views WHERE slug = ?")
            .bind(slug)
            .fetch_one(&mut *tx)
            .await?;
        let daily_total: i64 = sqlx::query_scalar("SELECT views FROM daily_views WHERE date = ?")
            .bind(date_key)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((post_total, daily_total))
    }

    pub async fn get_views(&self, slug: &str) -> anyhow::Result<i64> {
        let views: Option<i64> = sqlx::query_scalar("SELECT views FROM post_views WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(views.unwrap_or(0))
    }

    /// Moves the whole-post like counter by `delta`, clamped at zero.
    /// Returns the new count.
    pub async fn adjust_post_likes(&self, post_id: &str, delta: i64) -> anyhow::Result<i64> {
        sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, likes) VALUES (?, MAX(0, ?))
            ON CONFLICT(post_id) DO UPDATE SET likes = MAX(0, likes + ?)
            "#,
        )
        .bind(post_id)
        .bind(delta)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        let likes: i64 = sqlx::query_scalar("SELECT likes FROM post_likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(likes)
    }

    pub async fn get_post_likes(&self, post_id: &str) -> anyhow::Result<i64> {
        let likes: Option<i64> = sqlx::query_scalar("SELECT likes FROM post_likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(likes.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn views_accumulate_per_post_and_day() {
        let db = Db::new("sqlite::memory:").await.unwrap();

        assert_eq!(db.record_view("hello", "2026-08-28").await.unwrap(), (1, 1));
        assert_eq!(db.record_view("hello", "2026-08-28").await.unwrap(), (2, 2));
        assert_eq!(db.record_view("other", "2026-08-28").await.unwrap(), (1, 3));
        assert_eq!(db.get_views("hello").await.unwrap(), 2);
        assert_eq!(db.get_views("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn post_likes_clamp_at_zero() {
        let db = Db::new("sqlite::memory:").await.unwrap();

        assert_eq!(db.adjust_post_likes("p1", 1).await.unwrap(), 1);
        assert_eq!(db.adjust_post_likes("p1", 1).await.unwrap(), 2);
        assert_eq!(db.adjust_post_likes("p1", -5).await.unwrap(), 0);
        assert_eq!(db.adjust_post_likes("p2", -1).await.unwrap(), 0);
        assert_eq!(db.get_post_likes("p1").await.unwrap(), 0);
    }
}
