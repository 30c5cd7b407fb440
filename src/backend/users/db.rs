//! Database operations for users.

use sqlx::PgPool;
use uuid::Uuid;

use crate::shared::models::User;

/// Insert the user row if it does not exist yet, otherwise fill in the email
/// when none is stored. An already-present email is never overwritten.
pub async fn upsert_user(
    pool: &PgPool,
    id: Uuid,
    email: Option<&str>,
    username: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, username)
        VALUES ($1, $2, COALESCE($3, ''))
        ON CONFLICT (id) DO UPDATE
        SET email = COALESCE(users.email, $2),
            username = COALESCE($3, users.username)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(username)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, COALESCE(email, '') AS email, username, nickname, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, COALESCE(email, '') AS email, username, nickname, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Case-insensitive substring search over nicknames, excluding the caller.
pub async fn search_users_by_nickname(
    pool: &PgPool,
    query: &str,
    self_id: Uuid,
    limit: i64,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, COALESCE(email, '') AS email, username, nickname, created_at
        FROM users
        WHERE nickname ILIKE $1
          AND id != $2
        LIMIT $3
        "#,
    )
    .bind(format!("%{}%", query))
    .bind(self_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
