//! Router assembly.
//!
//! Every route, the socket endpoint included, sits behind the auth gate.
//! CORS is permissive; browsers talk to this service from arbitrary dev
//! origins and real access control is the session cookie.

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::backend::middleware::auth::auth_middleware;
use crate::backend::realtime::socket::serve_ws;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let router = Router::new().route("/ws", get(serve_ws));
    let router = configure_api_routes(router);

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
