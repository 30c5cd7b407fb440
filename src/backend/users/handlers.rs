//! HTTP handlers for account updates and user search.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::users::db;
use crate::shared::models::User;

/// Queries shorter than this return an empty result instead of scanning.
const MIN_SEARCH_QUERY_LEN: usize = 2;
const SEARCH_RESULT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct UpdateUserPayload {
    pub email: Option<String>,
    pub username: Option<String>,
}

/// `POST /users/me`
pub async fn update_user(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<Value>, BackendError> {
    db::upsert_user(
        &pool,
        user.user_id,
        payload.email.as_deref(),
        payload.username.as_deref(),
    )
    .await?;

    Ok(Json(json!({"status": "user updated"})))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// `GET /users/search?q=<substring>`
pub async fn search_users(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, BackendError> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| BackendError::bad_request("search query 'q' is required"))?;

    if query.len() < MIN_SEARCH_QUERY_LEN {
        return Ok(Json(Vec::new()));
    }

    let users =
        db::search_users_by_nickname(&pool, &query, user.user_id, SEARCH_RESULT_LIMIT).await?;
    Ok(Json(users))
}
