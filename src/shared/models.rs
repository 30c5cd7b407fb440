//! Domain types shared by the REST handlers, the realtime dispatcher and the
//! database modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as created by the external identity service and mirrored here on
/// first contact.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub nickname: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Blocked,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Blocked => "blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            "blocked" => Some(FriendshipStatus::Blocked),
            _ => None,
        }
    }
}

/// Order a pair of user ids so the smaller one comes first. Friendship rows
/// are stored exactly once per unordered pair in this orientation.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// An unordered relation between two users. `action_user_id` is whichever
/// party last changed the status: the originator while pending, the accepter
/// once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub user_one_id: Uuid,
    pub user_two_id: Uuid,
    pub status: FriendshipStatus,
    pub action_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Build a friendship with the pair canonicalised. The database enforces
    /// the same ordering with a CHECK constraint.
    pub fn new(
        user_one_id: Uuid,
        user_two_id: Uuid,
        status: FriendshipStatus,
        action_user_id: Uuid,
    ) -> Self {
        let (user_one_id, user_two_id) = canonical_pair(user_one_id, user_two_id);
        let now = Utc::now();
        Self {
            user_one_id,
            user_two_id,
            status,
            action_user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Private,
    Group,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Private => "private",
            RoomType::Group => "group",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "private" => Some(RoomType::Private),
            "group" => Some(RoomType::Group),
            _ => None,
        }
    }
}

/// A message channel. Private rooms have exactly two participants and exist
/// only as the side effect of an accepted friend request. The last-message
/// fields are filled in by the room list query for sidebar previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "lastMessageContent", skip_serializing_if = "Option::is_none")]
    pub last_message_content: Option<String>,
    #[serde(
        rename = "lastMessageCreatedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_message_created_at: Option<DateTime<Utc>>,
}

/// A persisted chat message. `id` is the server ordering token, `message_uid`
/// the client idempotency token. Soft-deleted rows keep their `deleted_at`
/// and never appear in history reads.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub message_uid: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Friend entry of the roster response. `room_id` is the shared private room,
/// or the zero UUID when the lookup found none.
#[derive(Debug, Clone, Serialize)]
pub struct Friend {
    pub id: Uuid,
    pub nickname: String,
    #[serde(rename = "roomId")]
    pub room_id: Uuid,
}

/// Pending request entry of the roster response.
#[derive(Debug, Clone, Serialize)]
pub struct FriendRequest {
    #[serde(rename = "senderId")]
    pub sender_id: Uuid,
    #[serde(rename = "senderName")]
    pub sender_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_orders_ids() {
        let small = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let large = Uuid::parse_str("99999999-9999-9999-9999-999999999999").unwrap();

        assert_eq!(canonical_pair(small, large), (small, large));
        assert_eq!(canonical_pair(large, small), (small, large));
    }

    #[test]
    fn friendship_constructor_canonicalises() {
        let small = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let large = Uuid::parse_str("99999999-9999-9999-9999-999999999999").unwrap();

        let fs = Friendship::new(large, small, FriendshipStatus::Pending, large);
        assert_eq!(fs.user_one_id, small);
        assert_eq!(fs.user_two_id, large);
        assert_eq!(fs.action_user_id, large);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            FriendshipStatus::Pending,
            FriendshipStatus::Accepted,
            FriendshipStatus::Blocked,
        ] {
            assert_eq!(FriendshipStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(FriendshipStatus::from_str("rejected"), None);
    }

    #[test]
    fn room_type_round_trips_through_strings() {
        assert_eq!(RoomType::from_str("private"), Some(RoomType::Private));
        assert_eq!(RoomType::from_str("group"), Some(RoomType::Group));
        assert_eq!(RoomType::from_str("channel"), None);
    }
}
