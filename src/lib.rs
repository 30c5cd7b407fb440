//! chatwire: a real-time chat backend.
//!
//! Persistent one-to-one and group messaging over a framed binary WebSocket
//! protocol, with friendship management, read receipts and WebRTC signalling
//! relay. REST endpoints cover bulk reads and account updates; an external
//! identity service owns sessions.

pub mod backend;
pub mod shared;
