use std::time::Duration;

/// Errors that can occur while running or talking to a control server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] udpctl_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] udpctl_frame::FrameError),

    /// Audit log construction failed.
    #[error("log error: {0}")]
    Log(#[from] udpctl_log::LogError),

    /// The operation needs a started interface.
    #[error("control interface not started")]
    NotStarted,

    /// `start` was called on a server that is not inactive.
    #[error("control server already started")]
    AlreadyStarted,

    /// The receive thread could not be spawned.
    #[error("failed to spawn receive thread: {0}")]
    Spawn(std::io::Error),

    /// The receive thread panicked.
    #[error("receive thread panicked")]
    ReceiveThreadPanicked,

    /// No valid frame arrived in time.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// A response arrived with an id other than the expected one.
    #[error("unexpected response id 0x{got:04X} (expected 0x{expected:04X})")]
    UnexpectedResponse { expected: u16, got: u16 },
}

pub type Result<T> = std::result::Result<T, ServerError>;
