//! Server-side modules: HTTP surface, realtime delivery and persistence.
//!
//! The layout follows one feature per module, each with its own database
//! operations and handlers:
//!
//! - **`server`** - configuration, state, initialization
//! - **`routes`** - router assembly
//! - **`middleware`** - the auth gate
//! - **`error`** - error types and HTTP conversion
//! - **`users`** / **`friends`** / **`rooms`** / **`messaging`** - features
//! - **`realtime`** - hub, dispatcher, socket endpoint

pub mod error;
pub mod friends;
pub mod messaging;
pub mod middleware;
pub mod realtime;
pub mod rooms;
pub mod routes;
pub mod server;
pub mod users;

pub use error::BackendError;
pub use server::create_app;
