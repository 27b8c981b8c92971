use bytes::{Buf, BufMut, BytesMut};

use crate::catalog::{Command, MessageId};
use crate::error::{FrameError, Result};

/// Frame start marker.
pub const SYNC_PATTERN: [u8; 8] = [0x55, 0xAA, 0x00, 0xFF, 0xAA, 0x55, 0xFF, 0x00];

/// Size of the sync pattern in bytes.
pub const SYNC_PATTERN_SIZE: usize = SYNC_PATTERN.len();

/// Total size of every control frame.
pub const FRAME_SIZE: usize = 32;

/// Header: sync (8) + id (2) + data length (1) + version (1) + security (2)
/// + reserved (2) + verification (2) = 18 bytes.
pub const HEADER_SIZE: usize = 18;

/// Fixed payload block size.
pub const PAYLOAD_SIZE: usize = FRAME_SIZE - HEADER_SIZE;

/// Largest datagram the control interface reads in one receive.
pub const MAX_DATAGRAM_SIZE: usize = 64;

/// Format version written into outbound frames.
pub const FORMAT_VERSION: u8 = 1;

/// A decoded control frame.
///
/// The security number, reserved and verification fields are carried through
/// unchanged. Nothing checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMessage {
    /// Raw message id.
    pub id: u16,
    /// Declared payload byte count. Not checked against the payload block.
    pub data_len: u8,
    /// Protocol version tag.
    pub format_version: u8,
    pub security_number: u16,
    pub reserved: u16,
    pub verification: u16,
    /// Fixed-size opaque payload block.
    pub payload: [u8; PAYLOAD_SIZE],
}

impl ControlMessage {
    /// Create a frame with the given id, a declared length of 14, version 1,
    /// and every other field zeroed.
    pub fn new(id: u16) -> Self {
        Self {
            id,
            data_len: PAYLOAD_SIZE as u8,
            format_version: FORMAT_VERSION,
            security_number: 0,
            reserved: 0,
            verification: 0,
            payload: [0u8; PAYLOAD_SIZE],
        }
    }

    /// Create a request frame for a command.
    pub fn request(command: Command) -> Self {
        Self::new(command.request_id())
    }

    /// Create the canned response frame for a command.
    pub fn response_to(command: Command) -> Self {
        Self::new(command.response_id())
    }

    /// Catalog entry for this frame's id, if any.
    pub fn message_id(&self) -> Option<MessageId> {
        MessageId::from_raw(self.id)
    }

    /// Human-readable name for this frame's id.
    pub fn name(&self) -> Result<&'static str> {
        crate::catalog::message_name(self.id)
    }

    /// Serialize into the 32-byte wire layout.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        let mut dst = &mut out[..];
        put_message(self, &mut dst);
        out
    }
}

/// Returns true iff `buf` is exactly one frame long and starts with the sync
/// pattern. `buf` must already be trimmed to the received length.
pub fn validate(buf: &[u8]) -> bool {
    buf.len() == FRAME_SIZE && buf[..SYNC_PATTERN_SIZE] == SYNC_PATTERN
}

/// Decode a frame that has passed [`validate`].
///
/// The sync pattern is not re-checked.
pub fn decode(frame: &[u8; FRAME_SIZE]) -> ControlMessage {
    let mut src = &frame[SYNC_PATTERN_SIZE..];
    let id = src.get_u16();
    let data_len = src.get_u8();
    let format_version = src.get_u8();
    let security_number = src.get_u16();
    let reserved = src.get_u16();
    let verification = src.get_u16();

    let mut payload = [0u8; PAYLOAD_SIZE];
    payload.copy_from_slice(&frame[HEADER_SIZE..]);

    ControlMessage {
        id,
        data_len,
        format_version,
        security_number,
        reserved,
        verification,
        payload,
    }
}

/// Validate and decode in one step, reporting why a buffer was rejected.
pub fn parse(buf: &[u8]) -> Result<ControlMessage> {
    let frame: &[u8; FRAME_SIZE] = buf.try_into().map_err(|_| FrameError::InvalidLength {
        len: buf.len(),
        expected: FRAME_SIZE,
    })?;
    if frame[..SYNC_PATTERN_SIZE] != SYNC_PATTERN {
        return Err(FrameError::InvalidSync);
    }
    Ok(decode(frame))
}

/// Encode a frame into the wire format.
///
/// Wire format (multi-byte fields big-endian):
/// ```text
/// ┌────────────┬─────────┬─────────┬─────────┬──────────┬──────────┬──────────┬────────────┐
/// │ Sync (8B)  │ Id (2B) │ Len(1B) │ Ver(1B) │ Sec (2B) │ Rsv (2B) │ Vfy (2B) │ Data (14B) │
/// │ 55AA00FF   │         │         │         │          │          │          │            │
/// │ AA55FF00   │         │         │         │          │          │          │            │
/// └────────────┴─────────┴─────────┴─────────┴──────────┴──────────┴──────────┴────────────┘
/// ```
pub fn encode_message(message: &ControlMessage, dst: &mut BytesMut) {
    dst.reserve(FRAME_SIZE);
    put_message(message, dst);
}

fn put_message<B: BufMut>(message: &ControlMessage, dst: &mut B) {
    dst.put_slice(&SYNC_PATTERN);
    dst.put_u16(message.id);
    dst.put_u8(message.data_len);
    dst.put_u8(message.format_version);
    dst.put_u16(message.security_number);
    dst.put_u16(message.reserved);
    dst.put_u16(message.verification);
    dst.put_slice(&message.payload);
}
