use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use udpctl_log::LogConfig;
use udpctl_transport::{TransportConfig, CONTROL_PORT};

/// Where responses are sent relative to the request's source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Back to the exact source address and port.
    SourcePort,
    /// To the source IP at a fixed port.
    FixedPort(u16),
}

impl Default for ReplyTarget {
    fn default() -> Self {
        ReplyTarget::FixedPort(CONTROL_PORT)
    }
}

impl ReplyTarget {
    /// Destination of the response to a datagram from `source`.
    pub fn resolve(self, source: SocketAddr) -> SocketAddr {
        match self {
            ReplyTarget::SourcePort => source,
            ReplyTarget::FixedPort(port) => SocketAddr::new(source.ip(), port),
        }
    }
}

/// Which thread runs the receive loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThreadMode {
    /// The caller of [`ControlServer::run`](crate::ControlServer::run).
    #[default]
    Foreground,
    /// A dedicated receive thread; the caller stays free to monitor.
    Background,
}

/// Control server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: TransportConfig,
    pub log: LogConfig,
    pub reply_target: ReplyTarget,
    pub thread_mode: ThreadMode,
}

impl ServerConfig {
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn with_reply_target(mut self, reply_target: ReplyTarget) -> Self {
        self.reply_target = reply_target;
        self
    }

    pub fn with_thread_mode(mut self, thread_mode: ThreadMode) -> Self {
        self.thread_mode = thread_mode;
        self
    }
}

/// Configuration for a [`ControlClient`](crate::ControlClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub bind_addr: Ipv4Addr,
    /// Local port; 0 picks an ephemeral port. Bind the control port here to
    /// receive replies from a server answering on a fixed port.
    pub local_port: u16,
    /// How long `request` waits for a valid frame.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_addr: Ipv4Addr::UNSPECIFIED,
            local_port: 0,
            timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    pub fn with_bind_addr(mut self, bind_addr: Ipv4Addr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(self.bind_addr), self.local_port)
    }
}
