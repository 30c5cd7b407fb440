//! WebSocket endpoint.
//!
//! Each accepted connection becomes a registered hub session plus two
//! cooperating halves: a write task draining the session's outbound queue
//! onto the socket, and a read loop feeding inbound frames to the hub. When
//! either half sees the socket fail, or the hub closes the outbound queue,
//! the session is unregistered and both halves wind down.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::backend::middleware::auth::AuthUser;
use crate::backend::realtime::hub::{Client, HubHandle, OUTBOUND_QUEUE_SIZE};
use crate::backend::server::state::AppState;

/// `GET /ws`, upgraded after the auth gate has resolved the user.
pub async fn serve_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Response {
    let hub = state.hub.clone();
    // The upgrade builder has no read-side buffer knob; 1024 bytes applies
    // to the write buffer and the read side keeps the transport default.
    ws.write_buffer_size(1024)
        .on_upgrade(move |socket| handle_socket(socket, hub, user.user_id))
}

async fn handle_socket(socket: WebSocket, hub: HubHandle, user_id: Uuid) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (sender, mut outbound) = mpsc::channel::<Vec<u8>>(OUTBOUND_QUEUE_SIZE);
    let client = Client::new(user_id, sender);
    let connection_id = client.id;
    hub.register(client).await;

    // Write half: one binary frame per queued packet. The queue closing is
    // the hub telling us this session is over.
    let write_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_sender.send(Message::Binary(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    // Read half, on this task: forward payload bytes until the peer goes
    // away.
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Binary(data)) => hub.process(user_id, data.to_vec()).await,
            Ok(Message::Text(text)) => hub.process(user_id, text.as_bytes().to_vec()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%user_id, error = %e, "websocket read error");
                break;
            }
        }
    }

    hub.unregister(connection_id).await;
    let _ = write_task.await;
    tracing::debug!(%user_id, "websocket session closed");
}
