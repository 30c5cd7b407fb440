//! HTTP handlers for message history.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::messaging::db;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::rooms;
use crate::shared::models::Message;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// `GET /rooms/{id}/messages?limit=50&offset=0`
///
/// Returns the requested window oldest-first. Non-members get a 403 and no
/// hint of whether the room exists.
pub async fn get_messages(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
    Query(window): Query<HistoryQuery>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let is_member = rooms::db::is_user_in_room(&pool, user.user_id, room_id).await?;
    if !is_member {
        return Err(BackendError::forbidden(
            "user not authorized to access this room",
        ));
    }

    let messages = db::get_messages_for_room(&pool, room_id, window.limit, window.offset).await?;
    Ok(Json(messages))
}
