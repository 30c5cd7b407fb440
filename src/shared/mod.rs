//! Types shared across the backend: the wire protocol and the domain model.

pub mod models;
pub mod protocol;

pub use models::{Friend, FriendRequest, Friendship, FriendshipStatus, Message, Room, RoomType, User};
pub use protocol::{OpCode, Packet, ProtocolError};
