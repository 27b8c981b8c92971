//! UDP transport for the udpctl control interface.
//!
//! Owns the bound receive socket and its lifecycle:
//! - [`UdpTransport::activate`] binds the configured port
//! - [`UdpTransport::receive`] is the single blocking call of the receive loop
//! - every send goes out through a short-lived socket ([`send_datagram`])
//!
//! This is the lowest layer of udpctl. Owners learn about activation and
//! deactivation through a [`TransportObserver`].

pub mod error;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use traits::{NoopObserver, TransportObserver};
pub use udp::{
    bind_socket, send_datagram, TransportConfig, TransportState, UdpTransport, CONTROL_PORT,
    DEFAULT_MAX_DATAGRAM_SIZE,
};
