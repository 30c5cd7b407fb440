//! REST route table.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::friends;
use crate::backend::messaging;
use crate::backend::rooms;
use crate::backend::server::state::AppState;
use crate::backend::users;

/// Add the request/response endpoints to the router.
///
/// - `POST /users/me` - account update
/// - `GET  /users/search` - nickname search
/// - `GET  /friends` - roster and pending requests
/// - `POST /friends/requests` - send friend request
/// - `PUT  /friends/requests/{requester_id}/accept` - accept friend request
/// - `GET  /rooms` - room list
/// - `GET  /rooms/{id}/messages` - history window
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/users/me", post(users::handlers::update_user))
        .route("/users/search", get(users::handlers::search_users))
        .route("/friends", get(friends::handlers::get_friends))
        .route(
            "/friends/requests",
            post(friends::handlers::send_friend_request),
        )
        .route(
            "/friends/requests/{requester_id}/accept",
            put(friends::handlers::accept_friend_request),
        )
        .route("/rooms", get(rooms::handlers::get_rooms))
        .route(
            "/rooms/{id}/messages",
            get(messaging::handlers::get_messages),
        )
}
