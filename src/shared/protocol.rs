//! Wire protocol for the realtime socket.
//!
//! A packet is the opcode in decimal ASCII, a unit separator (0x1F), and the
//! payload fields joined by record separators (0x1E). Fields are opaque UTF-8
//! strings and are not escaped; callers must not embed either separator.

use thiserror::Error;

/// Separates the opcode prefix from the payload.
pub const UNIT_SEPARATOR: u8 = 0x1F;
/// Separates payload fields from each other.
pub const RECORD_SEPARATOR: u8 = 0x1E;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid packet format")]
    InvalidPacket,
}

/// Frame opcodes. Codes 10-12, 14 and 17 are reserved for presence and roster
/// events that clients already understand but the server does not yet emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    MsgSend = 1,
    MsgDeliver = 2,
    MsgEdit = 3,
    MsgEdited = 4,
    MsgDelete = 5,
    MsgDeleted = 6,
    MsgRead = 7,
    MsgStatusUpdate = 8,
    PresenceTypingOn = 10,
    PresenceTypingOff = 11,
    PresenceUpdate = 12,
    NotifyRoomAdded = 13,
    NotifyRoomRemoved = 14,
    FriendRequestReceived = 15,
    FriendRequestAccepted = 16,
    FriendRemoved = 17,
    WebRTCSignal = 20,
    Error = 255,
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<OpCode, u8> {
        match value {
            1 => Ok(OpCode::MsgSend),
            2 => Ok(OpCode::MsgDeliver),
            3 => Ok(OpCode::MsgEdit),
            4 => Ok(OpCode::MsgEdited),
            5 => Ok(OpCode::MsgDelete),
            6 => Ok(OpCode::MsgDeleted),
            7 => Ok(OpCode::MsgRead),
            8 => Ok(OpCode::MsgStatusUpdate),
            10 => Ok(OpCode::PresenceTypingOn),
            11 => Ok(OpCode::PresenceTypingOff),
            12 => Ok(OpCode::PresenceUpdate),
            13 => Ok(OpCode::NotifyRoomAdded),
            14 => Ok(OpCode::NotifyRoomRemoved),
            15 => Ok(OpCode::FriendRequestReceived),
            16 => Ok(OpCode::FriendRequestAccepted),
            17 => Ok(OpCode::FriendRemoved),
            20 => Ok(OpCode::WebRTCSignal),
            255 => Ok(OpCode::Error),
            other => Err(other),
        }
    }
}

/// A decoded frame. The opcode is kept as the raw byte so that frames with
/// codes outside the known table still parse; the dispatcher decides what to
/// do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub op: u8,
    pub payload: Vec<String>,
}

/// Decode a raw frame into opcode and payload fields.
///
/// Fails when the opcode prefix is missing, empty, or does not parse as an
/// unsigned 8-bit integer. A frame without a unit separator carries zero
/// fields; a frame with one carries at least one field (possibly empty).
pub fn parse(data: &[u8]) -> Result<Packet, ProtocolError> {
    let (prefix, tail) = match data.iter().position(|&b| b == UNIT_SEPARATOR) {
        Some(i) => (&data[..i], Some(&data[i + 1..])),
        None => (data, None),
    };

    if prefix.is_empty() {
        return Err(ProtocolError::InvalidPacket);
    }

    let op = std::str::from_utf8(prefix)
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .ok_or(ProtocolError::InvalidPacket)?;

    let payload = match tail {
        Some(tail) => {
            let text = String::from_utf8_lossy(tail);
            text.split(RECORD_SEPARATOR as char)
                .map(str::to_owned)
                .collect()
        }
        None => Vec::new(),
    };

    Ok(Packet { op, payload })
}

/// Encode a frame in the canonical form.
pub fn build(op: OpCode, fields: &[&str]) -> Vec<u8> {
    let op_str = (op as u8).to_string();
    let payload_len: usize = fields.iter().map(|f| f.len() + 1).sum();

    let mut buf = Vec::with_capacity(op_str.len() + 1 + payload_len);
    buf.extend_from_slice(op_str.as_bytes());
    buf.push(UNIT_SEPARATOR);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            buf.push(RECORD_SEPARATOR);
        }
        buf.extend_from_slice(field.as_bytes());
    }
    buf
}
