use crate::sql::{impl_repository, map_sqlx_error, Statements};
use burrow_core::repository::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use typed_builder::TypedBuilder;

const SCHEMA: &str = include_str!("../ddl/postgres/urls.sql");

/// Connection pool settings for [`PostgresRepository::connect_with`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct PostgresPoolSettings {
    #[builder(default = 10)]
    pub max_connections: u32,
    #[builder(default = Duration::from_secs(30))]
    pub acquire_timeout: Duration,
    #[builder(default = Some(Duration::from_secs(600)))]
    pub idle_timeout: Option<Duration>,
    #[builder(default = Some(Duration::from_secs(1800)))]
    pub max_lifetime: Option<Duration>,
}

impl Default for PostgresPoolSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// PostgreSQL implementation of the repository contract.
///
/// Deletes are hard deletes, so a removed short code can be taken again by a
/// later insert. Each operation is one statement in its own implicit
/// transaction; the `UNIQUE` constraint on `short_code` arbitrates
/// concurrent creators.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool with default settings and applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(database_url, PostgresPoolSettings::default()).await
    }

    /// Opens a pool with the given settings and applies the schema.
    pub async fn connect_with(database_url: &str, settings: PostgresPoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(settings.idle_timeout)
            .max_lifetime(settings.max_lifetime)
            .connect(database_url)
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
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const STATEMENTS: Statements = Statements {
    insert: r#"
        INSERT INTO urls (short_code, original_url, clicks, created_at)
        VALUES ($1, $2, 0, $3)
        RETURNING id
    "#,
    select: r#"
        SELECT id, short_code, original_url, clicks, created_at, last_accessed
        FROM urls
        WHERE short_code = $1
    "#,
    update: r#"
        UPDATE urls
        SET original_url = $1, clicks = $2, last_accessed = $3
        WHERE short_code = $4
    "#,
    delete: "DELETE FROM urls WHERE short_code = $1",
    list: r#"
        SELECT id, short_code, original_url, clicks, created_at, last_accessed
        FROM urls
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
    "#,
};

impl_repository!(PostgresRepository, STATEMENTS);
