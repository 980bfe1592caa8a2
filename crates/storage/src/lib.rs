use anyhow::Context;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::{fs, path::Path, time::Duration};

mod models;
mod repo;

pub use repo::comments::NewComment;

/// Handle to the murmur SQLite database. Cheap to clone; every repo method
/// (comments, likes, counters) hangs off this type.
#[derive(Clone)]
pub struct Db {
    pub(crate) pool: Pool<Sqlite>,
}

impl Db {
    /// Opens the database at `db_url`, creating the file and its parent
    /// directory if needed, and brings the schema up to date. A fresh
    /// deployment can point straight at `sqlite://data/murmur.db`.
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        if let Some(file_path) = db_url
            .strip_prefix("sqlite://")
            .filter(|p| !p.contains(":memory:"))
        {
            if let Some(parent) = Path::new(file_path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url)
                .await
                .with_context(|| format!("Failed to create database at {}", db_url))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5))
            .connect(db_url)
            .await
            .with_context(|| format!("Failed to open database at {}", db_url))?;

        // Likes and view counters write on nearly every page load; WAL keeps
        // comment list reads unblocked while they tick up.
        sqlx::query("PRAGMA journal_mode = WAL;").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous = NORMAL;").execute(&pool).await?;

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_parent_directories_for_file_urls() {
        let dir = std::env::temp_dir().join(format!("murmur-db-test-{}", std::process::id()));
        let url = format!("sqlite://{}/nested/test.db", dir.display());

        let db = Db::new(&url).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        // Reopening runs migrations idempotently.
        drop(db);
        Db::new(&url).await.unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }
}
