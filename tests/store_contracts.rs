//! Store contract tests against a live Postgres.
//!
//! All tests here are ignored by default; run them with a database available
//! via `cargo test -- --ignored` (DATABASE_URL points at a disposable
//! database, migrations are applied automatically).

mod common;

use uuid::Uuid;

use chatwire::backend::{friends, messaging, rooms, users};
use chatwire::shared::models::{Friendship, FriendshipStatus, RoomType};
use common::TestDatabase;

async fn create_private_room(db: &TestDatabase, members: &[Uuid]) -> Uuid {
    let mut tx = db.pool().begin().await.unwrap();
    let room = rooms::db::create_room(&mut tx, RoomType::Private, None, None)
        .await
        .unwrap();
    for member in members {
        rooms::db::add_user_to_room(&mut tx, *member, room.id)
            .await
            .unwrap();
    }
    tx.commit().await.unwrap();
    room.id
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn upsert_preserves_existing_email() {
    let db = TestDatabase::new().await;
    let id = Uuid::new_v4();

    users::db::upsert_user(db.pool(), id, Some("first@example.com"), None)
        .await
        .unwrap();
    // A later upsert with no email must not erase the stored one.
    users::db::upsert_user(db.pool(), id, None, None).await.unwrap();

    let user = users::db::get_user_by_id(db.pool(), id).await.unwrap().unwrap();
    assert_eq!(user.email, "first@example.com");
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn friendship_rows_are_canonically_ordered() {
    let db = TestDatabase::new().await;
    let a = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "ann").await;
    let b = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "ben").await;

    let fs = Friendship::new(b, a, FriendshipStatus::Pending, b);
    friends::db::create_friendship(db.pool(), &fs).await.unwrap();

    // The row is found regardless of argument order and stays canonical.
    let found = friends::db::get_friendship(db.pool(), a, b).await.unwrap().unwrap();
    let found_rev = friends::db::get_friendship(db.pool(), b, a).await.unwrap().unwrap();
    assert!(found.user_one_id < found.user_two_id);
    assert_eq!(found.user_one_id, found_rev.user_one_id);

    // A second row for the same unordered pair is rejected.
    let dup = Friendship::new(a, b, FriendshipStatus::Pending, a);
    assert!(friends::db::create_friendship(db.pool(), &dup).await.is_err());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn accept_transaction_commits_room_and_participants_together() {
    let db = TestDatabase::new().await;
    let requester = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "req").await;
    let accepter = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "acc").await;

    let fs = Friendship::new(requester, accepter, FriendshipStatus::Pending, requester);
    friends::db::create_friendship(db.pool(), &fs).await.unwrap();

    let mut tx = db.pool().begin().await.unwrap();
    let mut accepted = fs.clone();
    accepted.status = FriendshipStatus::Accepted;
    accepted.action_user_id = accepter;
    friends::db::update_friendship_status(&mut tx, &accepted).await.unwrap();
    let room = rooms::db::create_room(&mut tx, RoomType::Private, None, None).await.unwrap();
    rooms::db::add_user_to_room(&mut tx, accepter, room.id).await.unwrap();
    rooms::db::add_user_to_room(&mut tx, requester, room.id).await.unwrap();
    tx.commit().await.unwrap();

    let stored = friends::db::get_friendship(db.pool(), requester, accepter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, FriendshipStatus::Accepted);
    assert_eq!(stored.action_user_id, accepter);

    let shared = rooms::db::find_private_room_by_participants(db.pool(), requester, accepter)
        .await
        .unwrap();
    assert_eq!(shared, Some(room.id));
    assert!(rooms::db::is_user_in_room(db.pool(), requester, room.id).await.unwrap());
    assert!(rooms::db::is_user_in_room(db.pool(), accepter, room.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn dropped_transaction_leaves_no_rows() {
    let db = TestDatabase::new().await;
    let a = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "ada").await;
    let b = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "bob").await;

    {
        let mut tx = db.pool().begin().await.unwrap();
        let room = rooms::db::create_room(&mut tx, RoomType::Private, None, None).await.unwrap();
        rooms::db::add_user_to_room(&mut tx, a, room.id).await.unwrap();
        // Simulated failure: the transaction goes out of scope uncommitted.
    }

    let shared = rooms::db::find_private_room_by_participants(db.pool(), a, b).await.unwrap();
    assert_eq!(shared, None);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn blocked_participants_are_not_members() {
    let db = TestDatabase::new().await;
    let a = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "ava").await;
    let b = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "bev").await;
    let room = create_private_room(&db, &[a, b]).await;

    sqlx::query("UPDATE room_participants SET is_blocked = true WHERE room_id = $1 AND user_id = $2")
        .bind(room)
        .bind(b)
        .execute(db.pool())
        .await
        .unwrap();

    assert!(rooms::db::is_user_in_room(db.pool(), a, room).await.unwrap());
    assert!(!rooms::db::is_user_in_room(db.pool(), b, room).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn private_room_lookup_requires_exactly_two_participants() {
    let db = TestDatabase::new().await;
    let a = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "one").await;
    let b = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "two").await;
    let c = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "three").await;

    create_private_room(&db, &[a, b, c]).await;

    let shared = rooms::db::find_private_room_by_participants(db.pool(), a, b).await.unwrap();
    assert_eq!(shared, None);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn history_is_ascending_and_skips_deleted_messages() {
    let db = TestDatabase::new().await;
    let author = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "kay").await;
    let room = create_private_room(&db, &[author]).await;

    let mut ids = Vec::new();
    for text in ["one", "two", "three"] {
        let message = messaging::db::create_message(db.pool(), room, author, None, text, None)
            .await
            .unwrap();
        ids.push(message.id);
    }

    messaging::db::delete_message(db.pool(), ids[1], author).await.unwrap();

    let history = messaging::db::get_messages_for_room(db.pool(), room, 50, 0)
        .await
        .unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["one", "three"]);
    assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn edits_and_deletes_are_author_guarded() {
    let db = TestDatabase::new().await;
    let author = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "amy").await;
    let other = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "eve").await;
    let room = create_private_room(&db, &[author, other]).await;

    let message = messaging::db::create_message(db.pool(), room, author, None, "original", None)
        .await
        .unwrap();

    assert!(messaging::db::update_message(db.pool(), message.id, other, "hijacked")
        .await
        .is_err());
    assert!(messaging::db::delete_message(db.pool(), message.id, other)
        .await
        .is_err());

    let history = messaging::db::get_messages_for_room(db.pool(), room, 50, 0)
        .await
        .unwrap();
    assert_eq!(history[0].content, "original");
    assert!(history[0].updated_at.is_none());

    messaging::db::update_message(db.pool(), message.id, author, "fixed")
        .await
        .unwrap();
    let history = messaging::db::get_messages_for_room(db.pool(), room, 50, 0)
        .await
        .unwrap();
    assert_eq!(history[0].content, "fixed");
    assert!(history[0].updated_at.is_some());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn client_supplied_message_uid_is_kept_and_unique() {
    let db = TestDatabase::new().await;
    let author = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "uid").await;
    let room = create_private_room(&db, &[author]).await;

    let uid = Uuid::new_v4();
    let message = messaging::db::create_message(db.pool(), room, author, Some(uid), "hi", None)
        .await
        .unwrap();
    assert_eq!(message.message_uid, uid);

    // Replaying the same idempotency token is rejected by the unique index.
    assert!(
        messaging::db::create_message(db.pool(), room, author, Some(uid), "hi again", None)
            .await
            .is_err()
    );

    // Without a token the server assigns one.
    let generated = messaging::db::create_message(db.pool(), room, author, None, "later", None)
        .await
        .unwrap();
    assert_ne!(generated.message_uid, Uuid::nil());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn read_receipts_are_idempotent_and_last_writer_wins() {
    let db = TestDatabase::new().await;
    let author = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "red").await;
    let reader = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "rdr").await;
    let room = create_private_room(&db, &[author, reader]).await;

    let message = messaging::db::create_message(db.pool(), room, author, None, "read me", None)
        .await
        .unwrap();

    let first = messaging::db::mark_message_as_read(db.pool(), message.id, reader)
        .await
        .unwrap();
    let second = messaging::db::mark_message_as_read(db.pool(), message.id, reader)
        .await
        .unwrap();
    assert!(second >= first);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM message_read_status WHERE message_id = $1 AND user_id = $2",
    )
    .bind(message.id)
    .bind(reader)
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn room_list_orders_by_latest_activity() {
    let db = TestDatabase::new().await;
    let user = db.create_user(&format!("{}@example.com", Uuid::new_v4()), "ord").await;

    let quiet = create_private_room(&db, &[user]).await;
    let busy = create_private_room(&db, &[user]).await;
    messaging::db::create_message(db.pool(), busy, user, None, "newest", None)
        .await
        .unwrap();

    let listed = rooms::db::get_rooms_for_user(db.pool(), user).await.unwrap();
    let positions: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    let busy_pos = positions.iter().position(|id| *id == busy).unwrap();
    let quiet_pos = positions.iter().position(|id| *id == quiet).unwrap();
    assert!(busy_pos < quiet_pos);

    let busy_room = listed.iter().find(|r| r.id == busy).unwrap();
    assert_eq!(busy_room.last_message_content.as_deref(), Some("newest"));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn nickname_search_excludes_caller_and_respects_limit() {
    let db = TestDatabase::new().await;
    let unique = Uuid::new_v4().simple().to_string();
    let suffix = &unique[..8];
    let caller = db
        .create_user(&format!("{}@example.com", Uuid::new_v4()), &format!("zed-{suffix}"))
        .await;
    for i in 0..12 {
        db.create_user(
            &format!("{}@example.com", Uuid::new_v4()),
            &format!("zed-{suffix}-{i}"),
        )
        .await;
    }

    let found = users::db::search_users_by_nickname(db.pool(), &format!("ZED-{suffix}"), caller, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 10);
    assert!(found.iter().all(|u| u.id != caller));
}
