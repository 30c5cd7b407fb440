//! HTTP handlers for the friendship lifecycle.
//!
//! Accepting a request is the one place rooms come into existence for
//! private chats: the status flip, the room row and both participant rows
//! commit in a single transaction, and only then are the two parties
//! notified and their live sessions subscribed.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::friends::db;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::{rooms, users};
use crate::shared::models::{Friend, FriendRequest, Friendship, FriendshipStatus, RoomType};
use crate::shared::protocol::{self, OpCode};

#[derive(Debug, Serialize)]
pub struct FriendsList {
    pub friends: Vec<Friend>,
    pub requests: Vec<FriendRequest>,
}

/// `GET /friends`
pub async fn get_friends(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<FriendsList>, BackendError> {
    let user_id = user.user_id;

    let accepted =
        db::get_friendships_for_user(&state.pool, user_id, FriendshipStatus::Accepted).await?;
    let pending =
        db::get_friendships_for_user(&state.pool, user_id, FriendshipStatus::Pending).await?;

    let mut friends = Vec::with_capacity(accepted.len());
    for fs in accepted {
        let friend_id = if fs.user_one_id == user_id {
            fs.user_two_id
        } else {
            fs.user_one_id
        };

        let friend = match users::db::get_user_by_id(&state.pool, friend_id).await {
            Ok(Some(friend)) => friend,
            _ => {
                tracing::warn!(%friend_id, "could not find user data for friend");
                continue;
            }
        };

        let room_id =
            match rooms::db::find_private_room_by_participants(&state.pool, user_id, friend_id)
                .await
            {
                Ok(Some(room_id)) => room_id,
                Ok(None) => {
                    tracing::warn!(%user_id, %friend_id, "no shared private room found");
                    Uuid::nil()
                }
                Err(e) => {
                    tracing::error!(%user_id, %friend_id, error = %e, "error finding shared room");
                    Uuid::nil()
                }
            };

        friends.push(Friend {
            id: friend.id,
            nickname: friend.nickname,
            room_id,
        });
    }

    let mut requests = Vec::new();
    for fs in pending {
        // Only requests initiated by the other party are actionable here.
        if fs.action_user_id == user_id {
            continue;
        }
        let requester = match users::db::get_user_by_id(&state.pool, fs.action_user_id).await {
            Ok(Some(requester)) => requester,
            _ => {
                tracing::warn!(requester_id = %fs.action_user_id, "could not find user data for requester");
                continue;
            }
        };
        requests.push(FriendRequest {
            sender_id: requester.id,
            sender_name: requester.nickname,
        });
    }

    Ok(Json(FriendsList { friends, requests }))
}

#[derive(Debug, Deserialize)]
pub struct SendFriendRequestPayload {
    pub email: String,
}

/// `POST /friends/requests`
pub async fn send_friend_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SendFriendRequestPayload>,
) -> Result<Json<Value>, BackendError> {
    let sender_id = user.user_id;

    let sender = users::db::get_user_by_id(&state.pool, sender_id)
        .await?
        .ok_or_else(|| BackendError::not_found("sender not found"))?;

    let receiver = users::db::get_user_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| {
            BackendError::not_found(format!("user with email {} not found", payload.email))
        })?;

    if receiver.id == sender_id {
        return Err(BackendError::not_found(
            "cannot send friend request to yourself",
        ));
    }

    if db::get_friendship(&state.pool, sender_id, receiver.id)
        .await?
        .is_some()
    {
        return Err(BackendError::not_found(
            "a friendship or pending request already exists with this user",
        ));
    }

    let fs = Friendship::new(
        sender_id,
        receiver.id,
        FriendshipStatus::Pending,
        sender_id,
    );
    db::create_friendship(&state.pool, &fs).await?;

    let notification = protocol::build(
        OpCode::FriendRequestReceived,
        &[&sender_id.to_string(), &sender.nickname],
    );
    state.hub.send_to_user(receiver.id, notification).await;

    tracing::info!(%sender_id, receiver_id = %receiver.id, "friend request sent");
    Ok(Json(json!({"status": "friend request sent"})))
}

/// `PUT /friends/requests/{requester_id}/accept`
pub async fn accept_friend_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(requester_id): Path<Uuid>,
) -> Result<Json<Value>, BackendError> {
    let accepter_id = user.user_id;

    let fs = db::get_friendship(&state.pool, accepter_id, requester_id)
        .await?
        .ok_or_else(|| BackendError::bad_request("no pending friend request found"))?;

    if fs.status != FriendshipStatus::Pending || fs.action_user_id == accepter_id {
        return Err(BackendError::bad_request("invalid friend request state"));
    }

    // Status flip, room and both memberships commit together; an early
    // return rolls the transaction back on drop.
    let mut tx = state.pool.begin().await?;

    let mut accepted = fs;
    accepted.status = FriendshipStatus::Accepted;
    accepted.action_user_id = accepter_id;
    db::update_friendship_status(&mut tx, &accepted).await?;

    let room = rooms::db::create_room(&mut tx, RoomType::Private, None, None).await?;
    rooms::db::add_user_to_room(&mut tx, accepter_id, room.id).await?;
    rooms::db::add_user_to_room(&mut tx, requester_id, room.id).await?;

    tx.commit().await?;

    let accepter_nickname = users::db::get_user_by_id(&state.pool, accepter_id)
        .await
        .ok()
        .flatten()
        .map(|u| u.nickname)
        .unwrap_or_default();

    let to_requester = protocol::build(
        OpCode::FriendRequestAccepted,
        &[
            &accepter_id.to_string(),
            &accepter_nickname,
            &room.id.to_string(),
        ],
    );
    state.hub.send_to_user(requester_id, to_requester).await;
    state.hub.subscribe(requester_id, room.id).await;

    let to_accepter = protocol::build(
        OpCode::NotifyRoomAdded,
        &[&room.id.to_string(), room.room_type.as_str(), ""],
    );
    state.hub.send_to_user(accepter_id, to_accepter).await;
    state.hub.subscribe(accepter_id, room.id).await;

    tracing::info!(%accepter_id, %requester_id, room_id = %room.id, "friend request accepted");
    Ok(Json(json!({"status": "friend request accepted"})))
}
