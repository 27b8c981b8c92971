use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use tracing::{debug, trace};
use udpctl_frame::{parse, Command, ControlMessage, MAX_DATAGRAM_SIZE};
use udpctl_transport::{bind_socket, TransportError};

use crate::config::ClientConfig;
use crate::error::{Result, ServerError};

/// Sends control frames to a server and waits for replies.
///
/// Replies only reach this socket when the server answers at the source
/// port, or when this client is bound to the server's fixed reply port.
#[derive(Debug)]
pub struct ControlClient {
    socket: UdpSocket,
    target: SocketAddr,
    config: ClientConfig,
}

impl ControlClient {
    /// Bind an ephemeral local socket aimed at `target`.
    pub fn connect(target: SocketAddr) -> Result<Self> {
        Self::with_config(target, ClientConfig::default())
    }

    pub fn with_config(target: SocketAddr, config: ClientConfig) -> Result<Self> {
        let socket = bind_socket(config.socket_addr())?;
        debug!(local = ?socket.local_addr().ok(), %target, "control client bound");
        Ok(Self {
            socket,
            target,
            config,
        })
    }

    /// Send one frame without waiting.
    pub fn send(&self, message: &ControlMessage) -> Result<()> {
        self.send_raw(&message.to_bytes())
    }

    /// Send arbitrary bytes, valid frame or not.
    pub fn send_raw(&self, bytes: &[u8]) -> Result<()> {
        self.socket
            .send_to(bytes, self.target)
            .map_err(|source| TransportError::Send {
                addr: self.target,
                source,
            })?;
        Ok(())
    }

    /// Send a frame and return the next valid frame received.
    ///
    /// Invalid datagrams are skipped. Fails with [`ServerError::Timeout`]
    /// when nothing valid arrives within the configured timeout.
    pub fn request(&self, message: &ControlMessage) -> Result<ControlMessage> {
        self.send(message)?;
        self.recv_within(self.config.timeout)
    }

    /// Send PING_INTERFACE and return the round-trip time.
    pub fn ping(&self) -> Result<Duration> {
        let started = Instant::now();
        let response = self.request(&ControlMessage::request(Command::PingInterface))?;
        let expected = Command::PingInterface.response_id();
        if response.id != expected {
            return Err(ServerError::UnexpectedResponse {
                expected,
                got: response.id,
            });
        }
        Ok(started.elapsed())
    }

    /// Wait up to `timeout` for the next valid frame.
    pub fn recv_within(&self, timeout: Duration) -> Result<ControlMessage> {
        self.recv_from_within(timeout).map(|(message, _)| message)
    }

    /// Like [`recv_within`](Self::recv_within), also returning the sender.
    pub fn recv_from_within(&self, timeout: Duration) -> Result<(ControlMessage, SocketAddr)> {
        let deadline = Instant::now() + timeout;
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ServerError::Timeout(timeout));
            }
            self.socket
                .set_read_timeout(Some(remaining))
                .map_err(TransportError::Socket)?;

            match self.socket.recv_from(&mut buf) {
                Ok((len, source)) => match parse(&buf[..len]) {
                    Ok(message) => return Ok((message, source)),
                    Err(e) => trace!(len, %source, error = %e, "skipping invalid datagram"),
                },
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(ServerError::Timeout(timeout));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Receive(e).into()),
            }
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| TransportError::Socket(e).into())
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}
