//! Property-based tests for the wire codec.
//!
//! Uses proptest to generate random opcodes and separator-free payloads and
//! verifies that encoding round-trips exactly.

use proptest::prelude::*;

use chatwire::shared::protocol::{self, OpCode, RECORD_SEPARATOR, UNIT_SEPARATOR};

const OPCODES: &[OpCode] = &[
    OpCode::MsgSend,
    OpCode::MsgDeliver,
    OpCode::MsgEdit,
    OpCode::MsgEdited,
    OpCode::MsgDelete,
    OpCode::MsgDeleted,
    OpCode::MsgRead,
    OpCode::MsgStatusUpdate,
    OpCode::NotifyRoomAdded,
    OpCode::FriendRequestReceived,
    OpCode::FriendRequestAccepted,
    OpCode::WebRTCSignal,
    OpCode::Error,
];

/// Field strings free of both separator bytes.
fn field_strategy() -> impl Strategy<Value = String> {
    "[^\\x1e\\x1f]{0,64}"
}

proptest! {
    #[test]
    fn parse_of_build_is_identity(
        op_index in 0..OPCODES.len(),
        fields in prop::collection::vec(field_strategy(), 1..6),
    ) {
        let op = OPCODES[op_index];
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();

        let packet = protocol::parse(&protocol::build(op, &refs)).unwrap();

        prop_assert_eq!(packet.op, op as u8);
        prop_assert_eq!(packet.payload, fields);
    }

    #[test]
    fn built_frames_contain_exactly_one_unit_separator(
        op_index in 0..OPCODES.len(),
        fields in prop::collection::vec(field_strategy(), 1..6),
    ) {
        let op = OPCODES[op_index];
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();

        let frame = protocol::build(op, &refs);

        let unit_count = frame.iter().filter(|&&b| b == UNIT_SEPARATOR).count();
        let record_count = frame.iter().filter(|&&b| b == RECORD_SEPARATOR).count();
        prop_assert_eq!(unit_count, 1);
        prop_assert_eq!(record_count, fields.len() - 1);
    }

    #[test]
    fn arbitrary_bytes_never_panic_the_parser(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = protocol::parse(&data);
    }
}
