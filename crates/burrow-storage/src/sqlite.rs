use crate::sql::{impl_repository, map_sqlx_error, Statements};
use burrow_core::repository::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const SCHEMA: &str = include_str!("../ddl/sqlite/urls.sql");

/// SQLite implementation of the repository contract.
///
/// Uniqueness of `short_code` is enforced by the schema; a violated
/// constraint on insert is reported as `AlreadyExists`. Every operation is a
/// single statement and relies on SQLite's per-statement atomicity.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing pool. The schema is not applied;
    /// call [`SqliteRepository::migrate`] if needed.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database file at `path` and applies the schema.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to one connection that is never recycled, since
    /// each SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_sqlx_error)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Creates the `urls` table and its index if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const STATEMENTS: Statements = Statements {
    insert: r#"
        INSERT INTO urls (short_code, original_url, clicks, created_at)
        VALUES (?, ?, 0, ?)
        RETURNING id
    "#,
    select: r#"
        SELECT id, short_code, original_url, clicks, created_at, last_accessed
        FROM urls
        WHERE short_code = ?
    "#,
    update: r#"
        UPDATE urls
        SET original_url = ?, clicks = ?, last_accessed = ?
        WHERE short_code = ?
    "#,
    delete: "DELETE FROM urls WHERE short_code = ?",
    list: r#"
        SELECT id, short_code, original_url, clicks, created_at, last_accessed
        FROM urls
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
    "#,
};

impl_repository!(SqliteRepository, STATEMENTS);
