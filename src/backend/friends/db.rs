//! Database operations for friendships.
//!
//! Every query canonicalises the pair before touching the table, matching the
//! CHECK constraint on the row. The constructor in `shared::models` does the
//! same; both layers enforcing it is deliberate.

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::shared::models::{canonical_pair, Friendship, FriendshipStatus};

fn row_to_friendship(row: &sqlx::postgres::PgRow) -> Friendship {
    let status: String = row.get("status");
    Friendship {
        user_one_id: row.get("user_one_id"),
        user_two_id: row.get("user_two_id"),
        status: FriendshipStatus::from_str(&status).unwrap_or(FriendshipStatus::Pending),
        action_user_id: row.get("action_user_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn create_friendship(pool: &PgPool, fs: &Friendship) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO friendships (user_one_id, user_two_id, status, action_user_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(fs.user_one_id)
    .bind(fs.user_two_id)
    .bind(fs.status.as_str())
    .bind(fs.action_user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Status update inside an open transaction; part of the accept flow.
pub async fn update_friendship_status(
    conn: &mut PgConnection,
    fs: &Friendship,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE friendships
        SET status = $3, action_user_id = $4, updated_at = now()
        WHERE user_one_id = $1 AND user_two_id = $2
        "#,
    )
    .bind(fs.user_one_id)
    .bind(fs.user_two_id)
    .bind(fs.status.as_str())
    .bind(fs.action_user_id)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn get_friendship(
    pool: &PgPool,
    user_one_id: Uuid,
    user_two_id: Uuid,
) -> Result<Option<Friendship>, sqlx::Error> {
    let (user_one_id, user_two_id) = canonical_pair(user_one_id, user_two_id);

    let row = sqlx::query(
        r#"
        SELECT user_one_id, user_two_id, status, action_user_id, created_at, updated_at
        FROM friendships
        WHERE user_one_id = $1 AND user_two_id = $2
        "#,
    )
    .bind(user_one_id)
    .bind(user_two_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_friendship))
}

pub async fn get_friendships_for_user(
    pool: &PgPool,
    user_id: Uuid,
    status: FriendshipStatus,
) -> Result<Vec<Friendship>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT user_one_id, user_two_id, status, action_user_id, created_at, updated_at
        FROM friendships
        WHERE (user_one_id = $1 OR user_two_id = $1) AND status = $2
        "#,
    )
    .bind(user_id)
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_friendship).collect())
}

pub async fn delete_friendship(
    pool: &PgPool,
    user_one_id: Uuid,
    user_two_id: Uuid,
) -> Result<(), sqlx::Error> {
    let (user_one_id, user_two_id) = canonical_pair(user_one_id, user_two_id);

    sqlx::query("DELETE FROM friendships WHERE user_one_id = $1 AND user_two_id = $2")
        .bind(user_one_id)
        .bind(user_two_id)
        .execute(pool)
        .await?;

    Ok(())
}
