//! `tokio_util` codec for control frames carried one per datagram.
//!
//! Intended for `tokio_util::udp::UdpFramed`, which hands the decoder one
//! whole datagram at a time. Datagrams that fail validation are consumed and
//! dropped, matching the blocking receive loop.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::codec::{decode, encode_message, validate, ControlMessage, FRAME_SIZE};
use crate::error::FrameError;

/// Datagram codec for [`ControlMessage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlCodec;

impl ControlCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for ControlCodec {
    type Item = ControlMessage;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let datagram = src.split();
        if !validate(&datagram) {
            trace!(len = datagram.len(), "dropping malformed datagram");
            return Ok(None);
        }

        let mut frame = [0u8; FRAME_SIZE];
        frame.copy_from_slice(&datagram);
        Ok(Some(decode(&frame)))
    }
}

impl Encoder<ControlMessage> for ControlCodec {
    type Error = FrameError;

    fn encode(&mut self, item: ControlMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message(&item, dst);
        Ok(())
    }
}
