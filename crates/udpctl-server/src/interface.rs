use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};
use udpctl_frame::{decode, validate, ControlMessage, FRAME_SIZE};
use udpctl_log::{AuditLog, ModuleId};
use udpctl_transport::{send_datagram, TransportError, TransportObserver, UdpTransport};

use crate::config::{ReplyTarget, ServerConfig};
use crate::dispatch::{ControlLink, Dispatcher, Outcome};
use crate::error::{Result, ServerError};

const MODULE: ModuleId = ModuleId::InterfaceManager;

/// Owns the transport and runs the receive, validate, dispatch loop.
///
/// At most one message is in flight. Frames are dispatched in receive order
/// on the thread that calls [`run`](Self::run).
#[derive(Debug)]
pub struct InterfaceManager {
    transport: UdpTransport,
    dispatcher: Arc<Dispatcher>,
    audit: Arc<AuditLog>,
    reply_target: ReplyTarget,
    receive_active: Arc<AtomicBool>,
    buf: Vec<u8>,
}

impl InterfaceManager {
    pub fn new(config: &ServerConfig, dispatcher: Arc<Dispatcher>, audit: Arc<AuditLog>) -> Self {
        let transport = UdpTransport::new(config.transport.clone()).with_observer(AuditObserver {
            audit: audit.clone(),
        });
        Self {
            transport,
            dispatcher,
            audit,
            reply_target: config.reply_target,
            receive_active: Arc::new(AtomicBool::new(false)),
            buf: vec![0u8; config.transport.max_datagram_size.max(FRAME_SIZE + 1)],
        }
    }

    /// Bind the control socket and arm the receive loop.
    pub fn start(&mut self) -> Result<SocketAddr> {
        match self.transport.activate() {
            Ok(local) => {
                self.audit
                    .event(MODULE, &format!("control interface active on {local}"));
                self.receive_active.store(true, Ordering::SeqCst);
                Ok(local)
            }
            Err(e) => {
                self.audit.critical(MODULE, &format!("start FAIL: {e}"));
                Err(e.into())
            }
        }
    }

    /// Receive and dispatch until stopped.
    ///
    /// Returns once a SHUTDOWN_INTERFACE frame, a [`StopHandle`] or a closed
    /// socket ends the loop. Stopping is observed only after the blocking
    /// receive returns.
    pub fn run(&mut self) -> Result<()> {
        if !self.transport.is_active() {
            return Err(ServerError::NotStarted);
        }
        debug!("receive loop started");
        while self.is_receiving() {
            self.poll();
        }
        debug!("receive loop exited");
        Ok(())
    }

    /// One blocking receive followed by validation and dispatch.
    ///
    /// Returns `None` when nothing was dispatched: invalid frames, timeouts,
    /// receive faults and wake datagrams.
    pub fn poll(&mut self) -> Option<Outcome> {
        let (len, source) = match self.transport.receive(&mut self.buf) {
            Ok(received) => received,
            Err(e) if e.is_timeout() => return None,
            Err(TransportError::Inactive) => {
                self.receive_active.store(false, Ordering::SeqCst);
                return None;
            }
            Err(e) => {
                warn!(os_code = ?e.os_code(), error = %e, "receive failed");
                self.audit.error(MODULE, &format!("receive FAIL: {e}"));
                return None;
            }
        };

        if !self.is_receiving() {
            return None;
        }

        let Ok(frame) = <&[u8; FRAME_SIZE]>::try_from(&self.buf[..len]) else {
            trace!(len, %source, "dropping datagram with wrong length");
            return None;
        };
        if !validate(frame) {
            trace!(len, %source, "dropping datagram with bad sync");
            return None;
        }

        let message = decode(frame);
        Some(self.handle(&message, source))
    }

    /// Log a decoded message and hand it to the dispatcher.
    pub fn handle(&mut self, message: &ControlMessage, source: SocketAddr) -> Outcome {
        let name = message.name().unwrap_or("UNKNOWN");
        self.audit
            .event(MODULE, &format!("Message to be processed: {name}"));

        let mut link = Link {
            transport: &mut self.transport,
            receive_active: &self.receive_active,
            audit: &self.audit,
            target: self.reply_target.resolve(source),
        };
        self.dispatcher.process(message, &mut link)
    }

    /// Stop the loop and close the control socket. Returns false if the
    /// socket was already closed.
    pub fn stop(&mut self) -> bool {
        stop_interface(&mut self.transport, &self.receive_active, &self.audit)
    }

    /// Handle for stopping the loop from another thread.
    ///
    /// Only meaningful after [`start`](Self::start).
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            receive_active: self.receive_active.clone(),
            wake_addr: self.transport.local_addr().map(wake_target),
        }
    }

    pub fn is_receiving(&self) -> bool {
        self.receive_active.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.transport.is_active()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn transport(&self) -> &UdpTransport {
        &self.transport
    }
}

/// Stops a receive loop from outside the receive thread.
///
/// Clears the receive flag and sends an empty datagram to the bound port so
/// the pending blocking receive returns.
#[derive(Debug, Clone)]
pub struct StopHandle {
    receive_active: Arc<AtomicBool>,
    wake_addr: Option<SocketAddr>,
}

impl StopHandle {
    pub fn stop(&self) {
        if !self.receive_active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(addr) = self.wake_addr {
            if let Err(e) = send_datagram(&[], addr) {
                debug!(%addr, error = %e, "wake datagram failed");
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        !self.receive_active.load(Ordering::SeqCst)
    }
}

struct Link<'a> {
    transport: &'a mut UdpTransport,
    receive_active: &'a AtomicBool,
    audit: &'a AuditLog,
    target: SocketAddr,
}

impl ControlLink for Link<'_> {
    fn send_response(
        &mut self,
        response: &ControlMessage,
    ) -> std::result::Result<SocketAddr, TransportError> {
        let result = self.transport.send_to(&response.to_bytes(), self.target);
        self.audit.event(
            MODULE,
            &format!(
                "response to ip: {}, port: {}",
                self.target.ip(),
                self.target.port()
            ),
        );
        result.map(|_| self.target)
    }

    fn stop_interface(&mut self) {
        stop_interface(self.transport, self.receive_active, self.audit);
    }
}

struct AuditObserver {
    audit: Arc<AuditLog>,
}

impl TransportObserver for AuditObserver {
    fn transport_active(&mut self, local: SocketAddr) {
        self.audit
            .event(MODULE, &format!("transport active on {local}"));
    }

    fn transport_inactive(&mut self) {
        self.audit.event(MODULE, "transport inactive");
    }
}

fn stop_interface(
    transport: &mut UdpTransport,
    receive_active: &AtomicBool,
    audit: &AuditLog,
) -> bool {
    receive_active.store(false, Ordering::SeqCst);
    if transport.deactivate() {
        audit.event(MODULE, "control interface stopped");
        true
    } else {
        audit.error(MODULE, "stop FAIL: interface not active");
        false
    }
}

fn wake_target(local: SocketAddr) -> SocketAddr {
    if local.ip().is_unspecified() {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), local.port())
    } else {
        local
    }
}
