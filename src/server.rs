//! Startup sequencing: config → pool → ping → serve.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::storage::PostgresStorage;
use crate::utils::shutdown_signal;

/// Validate `config`, open the database pool and verify it answers.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the database
/// cannot be reached. Nothing is retried.
pub async fn bootstrap(config: &Config) -> Result<AppState> {
    config.validate().map_err(ServiceError::InvalidConfig)?;

    let storage = PostgresStorage::connect(config).await?;
    Ok(AppState::new(Arc::new(storage)))
}

/// Bind `addr` and serve the API until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
