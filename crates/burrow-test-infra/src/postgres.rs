use crate::{Result, TestInfraError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const POSTGRES_PORT: u16 = 5432;

#[derive(Debug, Clone, TypedBuilder)]
pub struct PostgresConfig {
    #[builder(default = "burrow".to_string())]
    database: String,
    #[builder(default = "burrow".to_string())]
    username: String,
    #[builder(default = "burrow".to_string())]
    password: String,
    #[builder(default = "16-alpine".to_string())]
    tag: String,
    /// Durability settings are irrelevant for throwaway data.
    #[builder(default = true)]
    unsafe_fast: bool,
    #[builder(default = 20)]
    connect_attempts: u32,
    #[builder(default = Duration::from_millis(500))]
    connect_interval: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn server_command(config: &PostgresConfig) -> Vec<String> {
    let mut command = vec!["postgres".to_string()];
    if config.unsafe_fast {
        for setting in ["fsync=off", "synchronous_commit=off", "full_page_writes=off"] {
            command.push("-c".to_string());
            command.push(setting.to_string());
        }
    }
    command
}

/// Test fixture for a disposable PostgreSQL server.
///
/// The container is stopped and removed when the fixture is dropped.
pub struct PostgresServer {
    container: ContainerAsync<GenericImage>,
    config: PostgresConfig,
}

impl PostgresServer {
    /// Starts a PostgreSQL container suitable for integration tests.
    ///
    /// Use [`PostgresServer::connect`] rather than connecting directly: the
    /// readiness line is also printed by the temporary server the entrypoint
    /// runs during initdb.
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        let container = GenericImage::new("postgres", config.tag.as_str())
            .with_exposed_port(POSTGRES_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_DB", config.database.as_str())
            .with_env_var("POSTGRES_USER", config.username.as_str())
            .with_env_var("POSTGRES_PASSWORD", config.password.as_str())
            .with_cmd(server_command(&config))
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn host(&self) -> Result<String> {
        Ok(self.container.get_host().await?.to_string())
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(POSTGRES_PORT).await?)
    }

    pub async fn database_url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, self.config.database
        ))
    }

    /// Opens a pool once the real server accepts connections.
    pub async fn connect(&self) -> Result<PgPool> {
        let url = self.database_url().await?;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = PgPoolOptions::new()
                .max_connections(8)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&url)
                .await;

            match result {
                Ok(pool) => return Ok(pool),
                Err(_) if attempt < self.config.connect_attempts => {
                    tokio::time::sleep(self.config.connect_interval).await;
                }
                Err(source) => {
                    return Err(TestInfraError::Connect {
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
