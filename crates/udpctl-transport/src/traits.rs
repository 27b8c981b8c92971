use std::net::SocketAddr;

/// Receives transport lifecycle notifications.
///
/// Installed on a [`UdpTransport`](crate::UdpTransport) by its owner to learn
/// when the receive socket becomes available and when it goes away.
pub trait TransportObserver: Send {
    /// The receive socket is bound at `local`.
    fn transport_active(&mut self, local: SocketAddr);

    /// The receive socket has been released.
    fn transport_inactive(&mut self);
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TransportObserver for NoopObserver {
    fn transport_active(&mut self, _local: SocketAddr) {}

    fn transport_inactive(&mut self) {}
}
