//! UDP control-plane listener.
//!
//! udpctl listens on one UDP port for fixed 32-byte control frames, routes
//! them by message id, answers the ones it knows with canned responses and
//! keeps bounded event and error logs of everything it did.
//!
//! # Crate Structure
//!
//! - [`frame`]: wire codec, validator and message-id catalog
//! - [`transport`]: UDP socket lifecycle and one-shot sends
//! - [`log`]: ring-buffer event/error logs, clock and label registries
//! - [`server`]: dispatcher, interface manager, lifecycle owner and client
//!   (behind the `server` feature)

/// Re-export frame types.
pub mod frame {
    pub use udpctl_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use udpctl_transport::*;
}

/// Re-export audit log types.
pub mod log {
    pub use udpctl_log::*;
}

/// Re-export server types (requires `server` feature).
#[cfg(feature = "server")]
pub mod server {
    pub use udpctl_server::*;
}
