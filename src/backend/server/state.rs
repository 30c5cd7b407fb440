//! Application state.
//!
//! `AppState` is the central state container handed to the Axum router. The
//! `FromRef` implementations let handlers extract just the piece they need.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::realtime::hub::HubHandle;
use crate::backend::server::config::Config;

#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,
    /// Sending side of the delivery hub.
    pub hub: HubHandle,
    /// Client for identity service calls, built once with its timeout.
    pub auth_client: reqwest::Client,
    /// Loaded configuration.
    pub config: Arc<Config>,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for HubHandle {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}
