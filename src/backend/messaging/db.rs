//! Database operations for messages and read receipts.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::shared::models::Message;

/// Persist a new message. When `message_uid` is `None` the database assigns
/// one; otherwise the client-supplied idempotency token is stored and the
/// unique index rejects replays.
pub async fn create_message(
    pool: &PgPool,
    room_id: Uuid,
    user_id: Uuid,
    message_uid: Option<Uuid>,
    content: &str,
    reply_to_message_id: Option<i64>,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (message_uid, room_id, user_id, content, reply_to_message_id)
        VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4, $5)
        RETURNING id, message_uid, room_id, user_id, content, reply_to_message_id,
                  created_at, updated_at, deleted_at
        "#,
    )
    .bind(message_uid)
    .bind(room_id)
    .bind(user_id)
    .bind(content)
    .bind(reply_to_message_id)
    .fetch_one(pool)
    .await
}

/// History window for a room, oldest first. The index scan runs newest-first
/// so limit/offset pick the most recent window; the rows are flipped before
/// returning so callers always see ascending creation time.
pub async fn get_messages_for_room(
    pool: &PgPool,
    room_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Message>, sqlx::Error> {
    let mut messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, message_uid, room_id, user_id, content, reply_to_message_id,
               created_at, updated_at, deleted_at
        FROM messages
        WHERE room_id = $1 AND deleted_at IS NULL
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(room_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    messages.reverse();
    Ok(messages)
}

/// Replace a message's content. Only the author may edit; anyone else (or a
/// missing/deleted message) affects zero rows and reports `RowNotFound`.
pub async fn update_message(
    pool: &PgPool,
    message_id: i64,
    user_id: Uuid,
    new_content: &str,
) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET content = $1, updated_at = now()
        WHERE id = $2 AND user_id = $3 AND deleted_at IS NULL
        "#,
    )
    .bind(new_content)
    .bind(message_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    Ok(())
}

/// Soft-delete a message. Author-guarded like `update_message`; the row keeps
/// its content but vanishes from history reads.
pub async fn delete_message(
    pool: &PgPool,
    message_id: i64,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET deleted_at = now()
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(message_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    Ok(())
}

/// Record that a user has read a message. Last writer wins on repeats; the
/// stored timestamp is returned for the status broadcast.
pub async fn mark_message_as_read(
    pool: &PgPool,
    message_id: i64,
    user_id: Uuid,
) -> Result<DateTime<Utc>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO message_read_status (message_id, user_id, read_at)
        VALUES ($1, $2, now())
        ON CONFLICT (message_id, user_id) DO UPDATE SET read_at = now()
        RETURNING read_at
        "#,
    )
    .bind(message_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("read_at"))
}
