//! HTTP handlers for room listing.

use axum::{extract::State, Json};
use sqlx::PgPool;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::rooms::db;
use crate::shared::models::Room;

/// `GET /rooms`
pub async fn get_rooms(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Room>>, BackendError> {
    let rooms = db::get_rooms_for_user(&pool, user.user_id).await?;
    Ok(Json(rooms))
}
