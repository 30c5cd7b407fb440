//! Database operations for rooms and participants.

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::shared::models::{Room, RoomType};

fn row_to_room(row: &sqlx::postgres::PgRow) -> Room {
    let room_type: String = row.get("type");
    Room {
        id: row.get("id"),
        room_type: RoomType::from_str(&room_type).unwrap_or(RoomType::Group),
        name: row.get("name"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_message_content: row.try_get("last_message_content").unwrap_or(None),
        last_message_created_at: row.try_get("last_message_created_at").unwrap_or(None),
    }
}

pub async fn get_room_by_id(pool: &PgPool, room_id: Uuid) -> Result<Option<Room>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, type, name, owner_id, created_at, updated_at
        FROM rooms
        WHERE id = $1
        "#,
    )
    .bind(room_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_room))
}

/// Room creation inside an open transaction; part of the accept flow.
pub async fn create_room(
    conn: &mut PgConnection,
    room_type: RoomType,
    name: Option<&str>,
    owner_id: Option<Uuid>,
) -> Result<Room, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO rooms (type, name, owner_id)
        VALUES ($1, $2, $3)
        RETURNING id, type, name, owner_id, created_at, updated_at
        "#,
    )
    .bind(room_type.as_str())
    .bind(name)
    .bind(owner_id)
    .fetch_one(conn)
    .await?;

    Ok(row_to_room(&row))
}

/// Participant insert inside an open transaction; part of the accept flow.
pub async fn add_user_to_room(
    conn: &mut PgConnection,
    user_id: Uuid,
    room_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO room_participants (user_id, room_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(room_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Membership check. Blocked participants count as non-members.
pub async fn is_user_in_room(
    pool: &PgPool,
    user_id: Uuid,
    room_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM room_participants
            WHERE user_id = $1 AND room_id = $2 AND is_blocked = false
        ) AS is_member
        "#,
    )
    .bind(user_id)
    .bind(room_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("is_member"))
}

/// Rooms the user participates in, newest activity first. Each room carries a
/// preview of its latest message; rooms without messages fall back to their
/// creation time for ordering.
pub async fn get_rooms_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Room>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        WITH ranked_messages AS (
            SELECT room_id, content, created_at,
                   ROW_NUMBER() OVER (PARTITION BY room_id ORDER BY created_at DESC) AS rn
            FROM messages
            WHERE deleted_at IS NULL
        )
        SELECT r.id, r.type, r.name, r.owner_id, r.created_at, r.updated_at,
               lm.content AS last_message_content,
               lm.created_at AS last_message_created_at
        FROM rooms r
        JOIN room_participants rp ON r.id = rp.room_id
        LEFT JOIN ranked_messages lm ON r.id = lm.room_id AND lm.rn = 1
        WHERE rp.user_id = $1
        ORDER BY COALESCE(lm.created_at, r.created_at) DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_room).collect())
}

/// The unique private room whose participant set is exactly the given pair.
pub async fn find_private_room_by_participants(
    pool: &PgPool,
    user_one_id: Uuid,
    user_two_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT p1.room_id
        FROM room_participants p1
        JOIN room_participants p2 ON p1.room_id = p2.room_id
        JOIN rooms r ON p1.room_id = r.id
        WHERE r.type = 'private'
          AND p1.user_id = $1
          AND p2.user_id = $2
          AND (
              SELECT COUNT(*)
              FROM room_participants rp
              WHERE rp.room_id = p1.room_id
          ) = 2
        "#,
    )
    .bind(user_one_id)
    .bind(user_two_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.get("room_id")))
}
