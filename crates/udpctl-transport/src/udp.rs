use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::traits::{NoopObserver, TransportObserver};

/// Well-known UDP port of the control interface.
pub const CONTROL_PORT: u16 = 49153;

/// Largest datagram read by a single receive.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 64;

/// Bind parameters for the receive socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Local address to bind. Defaults to the wildcard address.
    pub bind_addr: Ipv4Addr,
    /// Local port to bind. Port 0 picks an ephemeral port.
    pub port: u16,
    /// Requested receive buffer size. Owners reading frames size their
    /// buffer at least one byte past a frame, so an oversized datagram reads
    /// long and fails frame validation instead of being cut to frame size.
    pub max_datagram_size: usize,
    /// Optional receive timeout. `None` blocks until a datagram arrives.
    pub read_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: Ipv4Addr::UNSPECIFIED,
            port: CONTROL_PORT,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            read_timeout: None,
        }
    }
}

impl TransportConfig {
    pub fn with_bind_addr(mut self, bind_addr: Ipv4Addr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Address the receive socket binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(self.bind_addr), self.port)
    }
}

/// Lifecycle state of a [`UdpTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Inactive,
    /// A receive socket is bound and owned by the transport.
    Active,
}

/// UDP transport for the control interface.
///
/// Owns one bound receive socket while active. Outbound datagrams never use
/// that socket: each send opens a temporary socket on an ephemeral port and
/// closes it afterwards.
pub struct UdpTransport {
    config: TransportConfig,
    socket: Option<UdpSocket>,
    local_addr: Option<SocketAddr>,
    last_source: Option<SocketAddr>,
    observer: Box<dyn TransportObserver>,
}

impl UdpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            socket: None,
            local_addr: None,
            last_source: None,
            observer: Box::new(NoopObserver),
        }
    }

    /// Install an observer for activation and deactivation events.
    pub fn with_observer(mut self, observer: impl TransportObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Create and bind the receive socket.
    ///
    /// On failure the transport stays inactive. Calling this while already
    /// active returns the existing local address.
    pub fn activate(&mut self) -> Result<SocketAddr> {
        if let Some(local) = self.local_addr {
            return Ok(local);
        }

        let addr = self.config.socket_addr();
        let socket = bind_socket(addr).inspect_err(|e| {
            warn!(%addr, os_code = ?e.os_code(), error = %e, "transport activation failed");
        })?;
        socket
            .set_read_timeout(self.config.read_timeout)
            .map_err(TransportError::Socket)?;
        let local = socket.local_addr().map_err(TransportError::Socket)?;

        info!(%local, "control socket bound");
        self.socket = Some(socket);
        self.local_addr = Some(local);
        self.observer.transport_active(local);
        Ok(local)
    }

    /// Block until a datagram arrives and copy it into `buf`.
    ///
    /// Records the sender address on success. Interrupted system calls are
    /// retried.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let socket = self.socket.as_ref().ok_or(TransportError::Inactive)?;
        loop {
            match socket.recv_from(buf) {
                Ok((len, source)) => {
                    debug!(len, %source, "datagram received");
                    self.last_source = Some(source);
                    return Ok((len, source));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Receive(e)),
            }
        }
    }

    /// Send one datagram to `target` through a temporary socket.
    pub fn send_to(&self, bytes: &[u8], target: SocketAddr) -> Result<usize> {
        send_datagram(bytes, target)
    }

    /// Send one datagram to a dotted-quad IPv4 address and port.
    pub fn send_to_ip(&self, bytes: &[u8], ip: &str, port: u16) -> Result<usize> {
        let parsed: Ipv4Addr = ip.parse().map_err(|source| TransportError::InvalidAddress {
            addr: ip.to_string(),
            source,
        })?;
        send_datagram(bytes, SocketAddr::new(IpAddr::V4(parsed), port))
    }

    /// Release the receive socket. Returns false if already inactive.
    pub fn deactivate(&mut self) -> bool {
        let Some(socket) = self.socket.take() else {
            return false;
        };
        drop(socket);
        let local = self.local_addr.take();
        debug!(?local, "control socket closed");
        self.observer.transport_inactive();
        true
    }

    pub fn state(&self) -> TransportState {
        if self.socket.is_some() {
            TransportState::Active
        } else {
            TransportState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.socket.is_some()
    }

    /// Bound address of the receive socket while active.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Sender of the most recent datagram.
    pub fn last_source(&self) -> Option<SocketAddr> {
        self.last_source
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp"
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("config", &self.config)
            .field("local_addr", &self.local_addr)
            .field("last_source", &self.last_source)
            .finish_non_exhaustive()
    }
}

/// Send one datagram from a temporary socket bound to an ephemeral port.
///
/// The socket is closed when this returns, whether or not the send succeeded.
pub fn send_datagram(bytes: &[u8], target: SocketAddr) -> Result<usize> {
    let local = match target {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = bind_socket(local)?;
    let result = socket.send_to(bytes, target);
    drop(socket);

    match result {
        Ok(sent) => {
            debug!(%target, sent, "datagram sent");
            Ok(sent)
        }
        Err(source) => {
            warn!(%target, os_code = ?source.raw_os_error(), error = %source, "send failed");
            Err(TransportError::Send {
                addr: target,
                source,
            })
        }
    }
}

/// Create a UDP socket bound to `addr`.
pub fn bind_socket(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(TransportError::Socket)?;
    socket
        .bind(&addr.into())
        .map_err(|source| TransportError::Bind { addr, source })?;
    Ok(socket.into())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn loopback_config() -> TransportConfig {
        TransportConfig::default()
            .with_bind_addr(Ipv4Addr::LOCALHOST)
            .with_port(0)
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Option<SocketAddr>>>>);

    impl TransportObserver for Recorder {
        fn transport_active(&mut self, local: SocketAddr) {
            self.0.lock().unwrap().push(Some(local));
        }

        fn transport_inactive(&mut self) {
            self.0.lock().unwrap().push(None);
        }
    }

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.port, 49153);
        assert_eq!(config.bind_addr, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.max_datagram_size, 64);
        assert_eq!(config.read_timeout, None);
    }

    #[test]
    fn test_activate_receive_records_source() {
        let mut transport = UdpTransport::new(loopback_config());
        assert_eq!(transport.state(), TransportState::Inactive);
        let local = transport.activate().unwrap();
        assert_eq!(transport.state(), TransportState::Active);
        assert_ne!(local.port(), 0);

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"hello", local).unwrap();

        let mut buf = [0u8; 64];
        let (len, source) = transport.receive(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello");
        assert_eq!(source, sender.local_addr().unwrap());
        assert_eq!(transport.last_source(), Some(source));
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut transport = UdpTransport::new(loopback_config());
        let first = transport.activate().unwrap();
        let second = transport.activate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bind_conflict_leaves_transport_inactive() {
        let mut first = UdpTransport::new(loopback_config());
        let local = first.activate().unwrap();

        let mut second = UdpTransport::new(loopback_config().with_port(local.port()));
        let err = second.activate().unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
        assert!(err.os_code().is_some());
        assert!(!second.is_active());
    }

    #[test]
    fn test_send_to_uses_temporary_socket() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let target = receiver.local_addr().unwrap();

        let mut transport = UdpTransport::new(loopback_config());
        let local = transport.activate().unwrap();
        assert_eq!(transport.send_to(b"abc", target).unwrap(), 3);

        let mut buf = [0u8; 8];
        let (len, from) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"abc");
        assert_ne!(from.port(), local.port());
    }

    #[test]
    fn test_send_to_ip_rejects_bad_address() {
        let transport = UdpTransport::new(loopback_config());
        let err = transport.send_to_ip(b"x", "not-an-ip", 1).unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress { .. }));
    }

    #[test]
    fn test_send_to_ip_delivers() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();

        let transport = UdpTransport::new(loopback_config());
        transport.send_to_ip(b"ping", "127.0.0.1", port).unwrap();

        let mut buf = [0u8; 8];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"ping");
    }

    #[test]
    fn test_deactivate_closes_socket_and_notifies() {
        let recorder = Recorder::default();
        let mut transport = UdpTransport::new(loopback_config()).with_observer(recorder.clone());
        let local = transport.activate().unwrap();

        assert!(transport.deactivate());
        assert!(!transport.deactivate());
        assert_eq!(transport.local_addr(), None);
        assert_eq!(*recorder.0.lock().unwrap(), vec![Some(local), None]);

        let mut buf = [0u8; 4];
        assert!(matches!(
            transport.receive(&mut buf),
            Err(TransportError::Inactive)
        ));

        // The port is free again once the socket is closed.
        UdpSocket::bind(local).unwrap();
    }

    #[test]
    fn test_read_timeout_surfaces_as_timeout() {
        let config = loopback_config().with_read_timeout(Some(Duration::from_millis(20)));
        let mut transport = UdpTransport::new(config);
        transport.activate().unwrap();

        let mut buf = [0u8; 4];
        let err = transport.receive(&mut buf).unwrap_err();
        assert!(err.is_timeout());
    }
}
