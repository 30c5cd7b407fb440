//! Inbound opcode dispatch.
//!
//! Every frame a client sends lands here after the hub has parsed it. The
//! dispatcher validates payload shape, checks room membership, applies the
//! store effect, and emits the resulting outbound frames through the hub
//! handle. Malformed payloads are logged and dropped; authorisation failures
//! are answered with an error frame to the sender only.
//!
//! # Dispatch Flow
//!
//! 1. Map the raw opcode byte onto the known table; unknown codes are
//!    logged and ignored.
//! 2. Destructure the payload for that opcode; wrong arity or unparsable
//!    identifiers drop the frame with a debug log.
//! 3. Check room membership for room-scoped opcodes; non-members receive a
//!    `255 Error` frame and nothing else happens.
//! 4. Apply the store effect (persist, author-guarded edit or delete, read
//!    receipt) and push the outbound frame through the hub.
//!
//! # Concurrency
//!
//! The hub spawns one task per inbound frame before calling
//! [`Dispatcher::handle_packet`], so store latency here never stalls the
//! hub loop. A failure while handling one client's frame is confined to
//! that client: the worst outcome is an error frame to the sender.

use chrono::SecondsFormat;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::realtime::hub::HubHandle;
use crate::backend::{messaging, rooms};
use crate::shared::protocol::{self, OpCode, Packet};

/// Opcode dispatcher: store pool on one side, hub handle on the other.
///
/// Cheap to clone; the hub clones it once per spawned dispatch task.
#[derive(Clone)]
pub struct Dispatcher {
    pool: PgPool,
    hub: HubHandle,
}

impl Dispatcher {
    pub fn new(pool: PgPool, hub: HubHandle) -> Self {
        Self { pool, hub }
    }

    /// Handle one parsed inbound frame from an authenticated sender.
    ///
    /// Never returns an error: every failure mode ends in a log line, and
    /// where the sender should know, an error frame.
    ///
    /// # Arguments
    ///
    /// * `sender_id` - user the frame arrived from, as resolved by the auth
    ///   gate at upgrade time
    /// * `packet` - the decoded frame
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use chatwire::backend::realtime::{hub, Dispatcher};
    /// use chatwire::shared::protocol;
    /// use sqlx::postgres::PgPoolOptions;
    /// use uuid::Uuid;
    ///
    /// # async fn example() -> Result<(), sqlx::Error> {
    /// let pool = PgPoolOptions::new().connect_lazy("postgres://localhost/chatwire")?;
    /// let (handle, _receivers) = hub::channel();
    /// let dispatcher = Dispatcher::new(pool, handle.clone());
    ///
    /// // Mark message 42 as read in a room.
    /// let frame = b"7\x1f42\x1e0aa9f3d2-7d55-4c44-a3a4-0f09d8a1b7c6";
    /// let packet = protocol::parse(frame).unwrap();
    /// dispatcher.handle_packet(Uuid::new_v4(), packet).await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn handle_packet(&self, sender_id: Uuid, packet: Packet) {
        let Ok(op) = OpCode::try_from(packet.op) else {
            tracing::warn!(op = packet.op, %sender_id, "unknown opcode received");
            return;
        };

        match op {
            OpCode::MsgSend => self.handle_msg_send(sender_id, &packet).await,
            OpCode::MsgEdit => self.handle_msg_edit(sender_id, &packet).await,
            OpCode::MsgDelete => self.handle_msg_delete(sender_id, &packet).await,
            OpCode::MsgRead => self.handle_msg_read(sender_id, &packet).await,
            OpCode::WebRTCSignal => self.handle_webrtc_signal(sender_id, &packet).await,
            other => {
                tracing::warn!(op = ?other, %sender_id, "unhandled opcode received");
            }
        }
    }

    /// Membership gate for room-scoped opcodes. Non-members get an error
    /// frame; store failures fail closed without one.
    async fn check_membership(&self, user_id: Uuid, room_id: Uuid) -> bool {
        match rooms::db::is_user_in_room(&self.pool, user_id, room_id).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(%user_id, %room_id, "packet rejected: not a room member");
                self.send_error(user_id, "Not a member of this room").await;
                false
            }
            Err(e) => {
                tracing::error!(%user_id, %room_id, error = %e, "membership check failed");
                false
            }
        }
    }

    async fn send_error(&self, user_id: Uuid, reason: &str) {
        self.hub
            .send_to_user(user_id, protocol::build(OpCode::Error, &[reason]))
            .await;
    }

    async fn handle_msg_send(&self, sender_id: Uuid, packet: &Packet) {
        let [room_id, client_msg_uid, content, ..] = packet.payload.as_slice() else {
            tracing::debug!(%sender_id, "malformed MsgSend payload");
            return;
        };
        let (Ok(room_id), Ok(client_msg_uid)) =
            (Uuid::parse_str(room_id), Uuid::parse_str(client_msg_uid))
        else {
            tracing::debug!(%sender_id, "malformed MsgSend identifiers");
            return;
        };

        if !self.check_membership(sender_id, room_id).await {
            return;
        }

        // A nil uid means the client wants a server-assigned idempotency
        // token.
        let message_uid = (!client_msg_uid.is_nil()).then_some(client_msg_uid);

        let message = match messaging::db::create_message(
            &self.pool,
            room_id,
            sender_id,
            message_uid,
            content,
            None,
        )
        .await
        {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(%sender_id, %room_id, error = %e, "failed to save message");
                self.send_error(sender_id, "Failed to save message").await;
                return;
            }
        };

        let frame = protocol::build(
            OpCode::MsgDeliver,
            &[
                &message.id.to_string(),
                &message.message_uid.to_string(),
                &message.room_id.to_string(),
                &message.user_id.to_string(),
                &message
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                &message.content,
            ],
        );
        self.hub.broadcast_to_room(room_id, frame).await;
    }

    async fn handle_msg_edit(&self, sender_id: Uuid, packet: &Packet) {
        let [message_id, room_id, new_content, ..] = packet.payload.as_slice() else {
            tracing::debug!(%sender_id, "malformed MsgEdit payload");
            return;
        };
        let (Ok(message_id), Ok(room_id)) = (message_id.parse::<i64>(), Uuid::parse_str(room_id))
        else {
            tracing::debug!(%sender_id, "malformed MsgEdit identifiers");
            return;
        };

        if !self.check_membership(sender_id, room_id).await {
            return;
        }

        if let Err(e) =
            messaging::db::update_message(&self.pool, message_id, sender_id, new_content).await
        {
            tracing::warn!(%sender_id, message_id, error = %e, "failed to edit message");
            self.send_error(sender_id, "Failed to edit message").await;
            return;
        }

        let frame = protocol::build(
            OpCode::MsgEdited,
            &[&message_id.to_string(), &room_id.to_string(), new_content],
        );
        self.hub.broadcast_to_room(room_id, frame).await;
        tracing::info!(%sender_id, message_id, %room_id, "message edited");
    }

    async fn handle_msg_delete(&self, sender_id: Uuid, packet: &Packet) {
        let [message_id, room_id, ..] = packet.payload.as_slice() else {
            tracing::debug!(%sender_id, "malformed MsgDelete payload");
            return;
        };
        let (Ok(message_id), Ok(room_id)) = (message_id.parse::<i64>(), Uuid::parse_str(room_id))
        else {
            tracing::debug!(%sender_id, "malformed MsgDelete identifiers");
            return;
        };

        if !self.check_membership(sender_id, room_id).await {
            return;
        }

        if let Err(e) = messaging::db::delete_message(&self.pool, message_id, sender_id).await {
            tracing::warn!(%sender_id, message_id, error = %e, "failed to delete message");
            self.send_error(sender_id, "Failed to delete message").await;
            return;
        }

        let frame = protocol::build(
            OpCode::MsgDeleted,
            &[&message_id.to_string(), &room_id.to_string()],
        );
        self.hub.broadcast_to_room(room_id, frame).await;
        tracing::info!(%sender_id, message_id, %room_id, "message deleted");
    }

    async fn handle_msg_read(&self, sender_id: Uuid, packet: &Packet) {
        let [message_id, room_id, ..] = packet.payload.as_slice() else {
            tracing::debug!(%sender_id, "malformed MsgRead payload");
            return;
        };
        let (Ok(message_id), Ok(room_id)) = (message_id.parse::<i64>(), Uuid::parse_str(room_id))
        else {
            tracing::debug!(%sender_id, "malformed MsgRead identifiers");
            return;
        };

        if !self.check_membership(sender_id, room_id).await {
            return;
        }

        let read_at =
            match messaging::db::mark_message_as_read(&self.pool, message_id, sender_id).await {
                Ok(read_at) => read_at,
                Err(e) => {
                    tracing::error!(%sender_id, message_id, error = %e, "failed to mark message as read");
                    self.send_error(sender_id, "Failed to mark message as read")
                        .await;
                    return;
                }
            };

        let frame = protocol::build(
            OpCode::MsgStatusUpdate,
            &[
                &message_id.to_string(),
                &room_id.to_string(),
                &sender_id.to_string(),
                "read",
                &read_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ],
        );
        self.hub.broadcast_to_room(room_id, frame).await;
    }

    /// Relay a WebRTC signal to the room, stamped with the sender. The sender
    /// receives its own signal back; clients filter by the sender id field.
    async fn handle_webrtc_signal(&self, sender_id: Uuid, packet: &Packet) {
        let [room_id_str, signal_payload, ..] = packet.payload.as_slice() else {
            tracing::debug!(%sender_id, "malformed WebRTCSignal payload");
            return;
        };
        let Ok(room_id) = Uuid::parse_str(room_id_str) else {
            tracing::debug!(%sender_id, "malformed WebRTCSignal room id");
            return;
        };

        if !self.check_membership(sender_id, room_id).await {
            return;
        }

        let frame = protocol::build(
            OpCode::WebRTCSignal,
            &[&sender_id.to_string(), room_id_str, signal_payload],
        );
        self.hub.broadcast_to_room(room_id, frame).await;
    }
}
