//! Server configuration.
//!
//! This module loads and validates the server configuration from
//! environment variables (a `.env` file is read by the binary before this
//! runs, so both sources look the same here).
//!
//! # Configuration Sources
//!
//! | Variable           | Required | Default                   |
//! |--------------------|----------|---------------------------|
//! | `DATABASE_URL`     | yes      | -                         |
//! | `SERVER_PORT`      | no       | `8080`                    |
//! | `AUTH_SERVICE_URL` | no       | `http://authservice:8080` |
//!
//! # Error Handling
//!
//! The database is mandatory: a missing `DATABASE_URL` aborts startup with
//! [`ConfigError::MissingDatabaseUrl`]. Everything else degrades to its
//! default; an unparsable `SERVER_PORT` is logged and replaced rather than
//! treated as fatal.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatwire::backend::server::config;
//!
//! let cfg = config::load().expect("DATABASE_URL must be set");
//! println!("listening on port {}", cfg.server_port);
//! ```

use thiserror::Error;

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_AUTH_SERVICE_URL: &str = "http://authservice:8080";

/// Errors that abort configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,
}

/// Loaded server configuration.
///
/// Built once at startup by [`load`] and shared through the application
/// state; nothing re-reads the environment after boot.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// TCP port the HTTP server binds on all interfaces.
    pub server_port: u16,
    /// Base URL of the external identity service; the auth gate appends
    /// `/auth/me`.
    pub auth_service_url: String,
}

/// Read the configuration from the environment.
///
/// # Returns
///
/// The loaded [`Config`], or [`ConfigError::MissingDatabaseUrl`] when the
/// one mandatory variable is absent.
///
/// `SERVER_PORT` defaults to 8080 (an unparsable value is logged and
/// replaced by the default). `AUTH_SERVICE_URL` defaults to the
/// compose-internal identity service address.
pub fn load() -> Result<Config, ConfigError> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

    let server_port = match std::env::var("SERVER_PORT") {
        Ok(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "invalid SERVER_PORT, using default");
            DEFAULT_SERVER_PORT
        }),
        Err(_) => DEFAULT_SERVER_PORT,
    };

    let auth_service_url = std::env::var("AUTH_SERVICE_URL")
        .unwrap_or_else(|_| DEFAULT_AUTH_SERVICE_URL.to_string());

    Ok(Config {
        database_url,
        server_port,
        auth_service_url,
    })
}
