//! Server initialization.
//!
//! Connects the pool, runs migrations, spawns the hub task, and assembles
//! the router. The hub handle is created first so the dispatcher and the
//! HTTP layer can hold it before the hub itself starts.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;

use crate::backend::error::BackendError;
use crate::backend::realtime::{hub, Dispatcher, Hub};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::Config;
use crate::backend::server::state::AppState;

const AUTH_SERVICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the application: database, hub task, router.
pub async fn create_app(config: Config) -> Result<Router, BackendError> {
    tracing::info!("connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    tracing::info!("database connection pool created");

    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("database migrations completed"),
        Err(e) => {
            // Already-applied migrations are the common cause here; the
            // server keeps starting and the first query will fail loudly if
            // the schema really is unusable.
            tracing::error!(error = %e, "failed to run database migrations");
        }
    }

    let (hub_handle, hub_receivers) = hub::channel();
    let dispatcher = Dispatcher::new(pool.clone(), hub_handle.clone());
    tokio::spawn(Hub::new(hub_receivers, pool.clone(), dispatcher).run());
    tracing::info!("delivery hub started");

    let auth_client = reqwest::Client::builder()
        .timeout(AUTH_SERVICE_TIMEOUT)
        .build()
        .map_err(|e| BackendError::internal(format!("failed to build auth client: {e}")))?;

    let state = AppState {
        pool,
        hub: hub_handle,
        auth_client,
        config: Arc::new(config),
    };

    Ok(create_router(state))
}
