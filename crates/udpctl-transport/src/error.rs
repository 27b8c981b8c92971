use std::net::SocketAddr;

/// Errors that can occur in UDP transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create a datagram socket.
    #[error("failed to create socket: {0}")]
    Socket(std::io::Error),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The blocking receive returned an error.
    #[error("receive failed: {0}")]
    Receive(std::io::Error),

    /// Sending a datagram failed.
    #[error("failed to send to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The target address string is not a valid IPv4 address.
    #[error("invalid target address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// The transport has no bound socket.
    #[error("transport inactive")]
    Inactive,
}

impl TransportError {
    /// Platform error code of the underlying socket failure, if any.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            TransportError::Socket(e) | TransportError::Receive(e) => e.raw_os_error(),
            TransportError::Bind { source, .. } | TransportError::Send { source, .. } => {
                source.raw_os_error()
            }
            TransportError::InvalidAddress { .. } | TransportError::Inactive => None,
        }
    }

    /// True when a receive gave up because the configured read timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TransportError::Receive(e)
                if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_code_is_exposed_for_socket_faults() {
        let err = TransportError::Receive(std::io::Error::from_raw_os_error(98));
        assert_eq!(err.os_code(), Some(98));
        assert_eq!(TransportError::Inactive.os_code(), None);
    }

    #[test]
    fn timeout_kinds_are_recognised() {
        let err = TransportError::Receive(std::io::ErrorKind::WouldBlock.into());
        assert!(err.is_timeout());
        let err = TransportError::Receive(std::io::ErrorKind::ConnectionReset.into());
        assert!(!err.is_timeout());
    }
}
