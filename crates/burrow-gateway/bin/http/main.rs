use anyhow::Context;
use burrow_core::{Repository, Shortener};
use burrow_gateway::cli::{StorageBackend, CLI};
use burrow_gateway::{telemetry, App, AppState};
use burrow_shortener::ShortenerService;
use burrow_storage::{InMemoryRepository, PostgresRepository, SqliteRepository};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    telemetry::init_tracing(config.log_format)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install tracing subscriber")?;

    let backend = config.storage_backend();

    info!(
        listen_addr = %config.listen_addr(),
        base_url = %config.base_url,
        short_code_len = config.short_code_len,
        storage_backend = %backend,
        "starting burrow http server"
    );

    match backend {
        StorageBackend::Postgres { url } => {
            let repository = PostgresRepository::connect(&url)
                .await
                .context("failed to connect to postgres")?;
            run_server(&config, repository).await
        }
        StorageBackend::InMemory => run_server(&config, InMemoryRepository::new()).await,
        StorageBackend::Sqlite { path } => {
            let repository = SqliteRepository::connect(&path)
                .await
                .with_context(|| format!("failed to open sqlite database {}", path.display()))?;
            run_server(&config, repository).await
        }
    }
}

async fn run_server<R: Repository>(config: &CLI, repository: R) -> anyhow::Result<()> {
    let service = Arc::new(ShortenerService::new(repository, config.short_code_len));
    let state = AppState::new(service.clone(), config.base_url.as_str());

    let listen_addr = config.listen_addr();
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped, closing storage");
    service.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
