use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};
use udpctl_log::{AuditLog, Clock, ModuleId};

use crate::config::{ServerConfig, ThreadMode};
use crate::dispatch::Dispatcher;
use crate::error::{Result, ServerError};
use crate::interface::{InterfaceManager, StopHandle};

const MODULE: ModuleId = ModuleId::Server;

/// Lifecycle state of a [`ControlServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Inactive,
    Active,
    ShuttingDown,
}

/// Process lifecycle owner for one control interface.
///
/// Activates the dispatcher, starts the interface manager and exposes the
/// audit logs. In [`ThreadMode::Background`] the receive loop runs on its own
/// thread and the caller acts as monitor.
pub struct ControlServer {
    config: Arc<ServerConfig>,
    audit: Arc<AuditLog>,
    dispatcher: Arc<Dispatcher>,
    state: ServerState,
    interface: Option<InterfaceManager>,
    receiver: Option<JoinHandle<InterfaceManager>>,
    stop_handle: Option<StopHandle>,
    local_addr: Option<SocketAddr>,
}

impl ControlServer {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let audit = AuditLog::new(&config.log)?;
        Ok(Self::from_parts(config, audit))
    }

    /// Create a server whose logs are stamped by `clock`.
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let audit = AuditLog::with_clock(&config.log, clock)?;
        Ok(Self::from_parts(config, audit))
    }

    fn from_parts(config: ServerConfig, audit: AuditLog) -> Self {
        let audit = Arc::new(audit);
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(Dispatcher::new(audit.clone())),
            audit,
            state: ServerState::Inactive,
            interface: None,
            receiver: None,
            stop_handle: None,
            local_addr: None,
        }
    }

    /// Activate the dispatcher and bind the control interface.
    ///
    /// In background mode the receive loop starts immediately. In foreground
    /// mode call [`run`](Self::run) next.
    pub fn start(&mut self) -> Result<SocketAddr> {
        if self.state != ServerState::Inactive {
            return Err(ServerError::AlreadyStarted);
        }

        self.audit.event(MODULE, "control server starting");
        self.dispatcher.activate();

        let mut interface =
            InterfaceManager::new(&self.config, self.dispatcher.clone(), self.audit.clone());
        let local = match interface.start() {
            Ok(local) => local,
            Err(e) => {
                self.dispatcher.deactivate();
                return Err(e);
            }
        };
        self.stop_handle = Some(interface.stop_handle());
        self.local_addr = Some(local);

        match self.config.thread_mode {
            ThreadMode::Foreground => self.interface = Some(interface),
            ThreadMode::Background => {
                let spawned = std::thread::Builder::new()
                    .name("udpctl-receive".to_string())
                    .spawn(move || {
                        if let Err(e) = interface.run() {
                            warn!(error = %e, "receive loop failed");
                        }
                        interface
                    });
                match spawned {
                    Ok(handle) => self.receiver = Some(handle),
                    Err(e) => {
                        self.dispatcher.deactivate();
                        self.stop_handle = None;
                        self.local_addr = None;
                        return Err(ServerError::Spawn(e));
                    }
                }
            }
        }

        self.state = ServerState::Active;
        info!(%local, mode = ?self.config.thread_mode, "control server active");
        Ok(local)
    }

    /// Run the receive loop until it stops.
    ///
    /// Foreground mode runs the loop on the calling thread. Background mode
    /// waits for the receive thread to finish.
    pub fn run(&mut self) -> Result<()> {
        if let Some(interface) = self.interface.as_mut() {
            return interface.run();
        }
        if self.receiver.is_some() {
            return self.join_receiver();
        }
        Err(ServerError::NotStarted)
    }

    /// Stop the receive loop and close the control socket.
    ///
    /// The dispatcher stays active.
    pub fn stop_interface(&mut self) -> Result<()> {
        if let Some(handle) = &self.stop_handle {
            handle.stop();
        }
        self.join_receiver()?;
        match self.interface.as_mut() {
            Some(interface) => {
                if interface.is_active() {
                    interface.stop();
                }
                Ok(())
            }
            None => Err(ServerError::NotStarted),
        }
    }

    /// Full shutdown: stop the interface, deactivate the dispatcher.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == ServerState::Inactive {
            return Ok(());
        }
        self.state = ServerState::ShuttingDown;
        self.audit.event(MODULE, "control server shutting down");

        let result = self.stop_interface();
        self.dispatcher.deactivate();
        self.interface = None;
        self.stop_handle = None;
        self.local_addr = None;
        self.state = ServerState::Inactive;
        self.audit.event(MODULE, "control server stopped");
        debug!("control server stopped");
        result
    }

    /// Ask the receive loop to stop from any thread holding a handle.
    pub fn request_shutdown(&self) {
        if let Some(handle) = &self.stop_handle {
            handle.stop();
        }
    }

    /// Clonable handle for stopping the receive loop, once started.
    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.stop_handle.clone()
    }

    pub fn is_active(&self) -> bool {
        self.state == ServerState::Active
    }

    /// True while a receive loop is armed or running.
    pub fn is_receiving(&self) -> bool {
        if let Some(receiver) = &self.receiver {
            return !receiver.is_finished();
        }
        self.interface
            .as_ref()
            .is_some_and(InterfaceManager::is_receiving)
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Rendered event log lines, oldest first. The log is not cleared.
    pub fn drain_event_log(&self) -> Vec<String> {
        self.audit.events().lines()
    }

    /// Rendered error log lines, oldest first. The log is not cleared.
    pub fn drain_error_log(&self) -> Vec<String> {
        self.audit.errors().lines()
    }

    /// Print the event log followed by the error log.
    pub fn print_logs(&self, out: &mut dyn Write) -> io::Result<()> {
        self.audit.print_all(out)
    }

    fn join_receiver(&mut self) -> Result<()> {
        let Some(receiver) = self.receiver.take() else {
            return Ok(());
        };
        let interface = receiver
            .join()
            .map_err(|_| ServerError::ReceiveThreadPanicked)?;
        self.interface = Some(interface);
        Ok(())
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        if self.state != ServerState::Inactive {
            if let Err(e) = self.stop() {
                debug!(error = %e, "stop on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for ControlServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlServer")
            .field("state", &self.state)
            .field("local_addr", &self.local_addr)
            .field("thread_mode", &self.config.thread_mode)
            .finish_non_exhaustive()
    }
}
