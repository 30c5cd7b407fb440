//! Realtime delivery: the hub, the opcode dispatcher and the socket endpoint.

pub mod dispatcher;
pub mod hub;
pub mod socket;

pub use dispatcher::Dispatcher;
pub use hub::{Client, Hub, HubHandle};
