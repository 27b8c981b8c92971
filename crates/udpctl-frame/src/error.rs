/// Errors that can occur during control frame parsing and catalog lookup.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The first eight bytes do not match the sync pattern.
    #[error("invalid sync pattern (expected 55 AA 00 FF AA 55 FF 00)")]
    InvalidSync,

    /// The buffer is not exactly one frame long.
    #[error("invalid frame length ({len} bytes, expected {expected})")]
    InvalidLength { len: usize, expected: usize },

    /// The message id has no entry in the catalog.
    #[error("message name not found for id 0x{0:04X}")]
    UnknownMessageId(u16),

    /// An I/O error surfaced through the async datagram codec.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
