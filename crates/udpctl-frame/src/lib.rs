//! Fixed-length control frame codec for the udpctl control interface.
//!
//! Every frame is exactly 32 bytes:
//! - An 8-byte sync pattern (`55 AA 00 FF AA 55 FF 00`)
//! - A 10-byte header (id, declared length, version, security, reserved, verification)
//! - A 14-byte opaque payload block
//!
//! There is no variable-length framing. A buffer either validates as one
//! whole frame or it is rejected.

pub mod catalog;
pub mod codec;
#[cfg(feature = "async")]
pub mod datagram;
pub mod error;

pub use catalog::{
    is_catalogued, is_response, message_name, Command, MessageId, RESPONSE_FLAG,
    SHUTDOWN_INTERFACE,
};
pub use codec::{
    decode, encode_message, parse, validate, ControlMessage, FORMAT_VERSION, FRAME_SIZE,
    HEADER_SIZE, MAX_DATAGRAM_SIZE, PAYLOAD_SIZE, SYNC_PATTERN, SYNC_PATTERN_SIZE,
};
#[cfg(feature = "async")]
pub use datagram::ControlCodec;
pub use error::{FrameError, Result};
