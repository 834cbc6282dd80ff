use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use hashlink_core::Storage;
use hashlink_storage::{InMemoryStorage, PoolSettings, PostgresStorage};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::app::App;
use crate::config::{Config, StorageBackend};
use crate::state::AppState;

/// Reads a connection string, joining all lines of the file.
pub fn read_dsn_file(path: &Path) -> std::io::Result<String> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.lines().collect())
}

/// Builds the storage backend selected by `config`.
pub async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    match config.storage_backend() {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        StorageBackend::Postgres => {
            let dsn = read_dsn_file(&config.dsn_file).with_context(|| {
                format!(
                    "failed to read connection string from {}",
                    config.dsn_file.display()
                )
            })?;
            let settings = PoolSettings::builder()
                .max_connections(config.max_connections)
                .acquire_timeout(config.storage_timeout())
                .build();
            let storage = PostgresStorage::connect(&dsn, settings)
                .await
                .context("unable to connect to database")?;
            Ok(Arc::new(storage))
        }
    }
}

/// Serves HTTP until `shutdown` resolves, then closes `storage`.
///
/// The storage is closed exactly once whether the server stopped cleanly,
/// failed to bind, or failed while serving.
pub async fn serve<F>(config: &Config, storage: Arc<dyn Storage>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = listen(config, Arc::clone(&storage), shutdown).await;
    storage.close().await;
    result
}

async fn listen<F>(config: &Config, storage: Arc<dyn Storage>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.listen_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(
        listen_addr = %listener.local_addr()?,
        storage_backend = %config.storage_backend(),
        base_url = %config.public_base_url(),
        "starting hashlink server"
    );

    let router = App::router(AppState::from_config(storage, config));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
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
