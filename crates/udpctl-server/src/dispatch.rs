use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};
use udpctl_frame::{Command, ControlMessage, MessageId};
use udpctl_log::{AuditLog, ModuleId};
use udpctl_transport::TransportError;

const MODULE: ModuleId = ModuleId::Dispatcher;

/// Actions a dispatcher can ask of the interface that delivered a message.
pub trait ControlLink {
    /// Send `response` back toward the message's sender.
    fn send_response(&mut self, response: &ControlMessage)
        -> Result<SocketAddr, TransportError>;

    /// Stop the receive loop and release the receive socket.
    fn stop_interface(&mut self);
}

/// Dispatcher lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Inactive,
    Active,
}

/// What the dispatcher did with one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The dispatcher is inactive. Nothing was logged or sent.
    Ignored,
    /// A canned response was built; `sent` reports the transport result.
    Responded { response: MessageId, sent: bool },
    /// The interface was told to stop. No response is sent.
    InterfaceStopped,
    /// A catalogued request without a handler yet.
    Unimplemented(Command),
    /// An id with no handler: REQUEST_APP_SHUTDOWN, a response id or an
    /// uncatalogued id.
    Unhandled(u16),
}

/// Routes decoded messages by id while active.
///
/// Activation is owned by the process lifecycle. Message content never
/// changes the dispatcher state.
#[derive(Debug)]
pub struct Dispatcher {
    active: AtomicBool,
    audit: Arc<AuditLog>,
}

impl Dispatcher {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self {
            active: AtomicBool::new(false),
            audit,
        }
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.audit.event(MODULE, "protocol dispatcher active");
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.audit.event(MODULE, "protocol dispatcher inactive");
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> DispatcherState {
        if self.is_active() {
            DispatcherState::Active
        } else {
            DispatcherState::Inactive
        }
    }

    /// Handle one message. A no-op while inactive.
    pub fn process(&self, message: &ControlMessage, link: &mut dyn ControlLink) -> Outcome {
        if !self.is_active() {
            return Outcome::Ignored;
        }

        let name = message.name().unwrap_or("UNKNOWN");
        self.audit.event(MODULE, &format!("processing {name}"));

        match message.message_id() {
            Some(MessageId::Request(
                command @ (Command::PingInterface | Command::RequestInterfaceControl),
            )) => self.respond(command, link),
            Some(MessageId::ShutdownInterface) => {
                link.stop_interface();
                Outcome::InterfaceStopped
            }
            Some(
                MessageId::Request(Command::RequestAppShutdown) | MessageId::Response(_),
            )
            | None => {
                self.audit.error(
                    MODULE,
                    &format!("Unhandled message. Id = {}", message.id),
                );
                Outcome::Unhandled(message.id)
            }
            Some(MessageId::Request(command)) => {
                debug!(id = message.id, name, "no handler for request");
                self.audit.event(
                    MODULE,
                    &format!("{} not implemented", command.request_name()),
                );
                Outcome::Unimplemented(command)
            }
        }
    }

    fn respond(&self, command: Command, link: &mut dyn ControlLink) -> Outcome {
        let response = ControlMessage::response_to(command);
        let name = command.response_name();
        let sent = match link.send_response(&response) {
            Ok(target) => {
                self.audit
                    .event(MODULE, &format!("sending SUCCESS for {name} to {target}"));
                true
            }
            Err(e) => {
                warn!(response = name, os_code = ?e.os_code(), error = %e, "response send failed");
                self.audit
                    .error(MODULE, &format!("sending FAIL for {name}"));
                false
            }
        };
        Outcome::Responded {
            response: MessageId::Response(command),
            sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use udpctl_log::{LogConfig, ManualClock};

    use super::*;

    #[derive(Default)]
    struct MockLink {
        sent: Vec<ControlMessage>,
        stopped: bool,
        fail_sends: bool,
    }

    impl ControlLink for MockLink {
        fn send_response(
            &mut self,
            response: &ControlMessage,
        ) -> Result<SocketAddr, TransportError> {
            if self.fail_sends {
                return Err(TransportError::Inactive);
            }
            self.sent.push(*response);
            Ok("127.0.0.1:49153".parse().unwrap())
        }

        fn stop_interface(&mut self) {
            self.stopped = true;
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<AuditLog>) {
        let audit = Arc::new(
            AuditLog::with_clock(&LogConfig::default(), Arc::new(ManualClock::new(0))).unwrap(),
        );
        (Dispatcher::new(audit.clone()), audit)
    }

    #[test]
    fn starts_inactive() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(dispatcher.state(), DispatcherState::Inactive);
        assert!(!dispatcher.is_active());
    }

    #[test]
    fn inactive_dispatcher_ignores_everything() {
        let (dispatcher, audit) = dispatcher();
        let mut link = MockLink::default();
        for id in [0x0001, 0x0002, 0xFFFF, 0x8001, 0x1234] {
            let outcome = dispatcher.process(&ControlMessage::new(id), &mut link);
            assert_eq!(outcome, Outcome::Ignored);
        }
        assert!(link.sent.is_empty());
        assert!(!link.stopped);
        assert!(audit.events().is_empty());
        assert!(audit.errors().is_empty());
    }

    #[test]
    fn ping_gets_canned_response() {
        let (dispatcher, audit) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();

        let outcome = dispatcher.process(
            &ControlMessage::request(Command::PingInterface),
            &mut link,
        );
        assert_eq!(
            outcome,
            Outcome::Responded {
                response: MessageId::Response(Command::PingInterface),
                sent: true
            }
        );
        assert_eq!(link.sent.len(), 1);
        let response = link.sent[0];
        assert_eq!(response.id, 0x8001);
        assert_eq!(response.data_len, 14);
        assert_eq!(response.format_version, 1);
        assert_eq!(response.payload, [0u8; 14]);

        let lines = audit.events().lines();
        assert!(lines.iter().any(|l| l.contains("processing PING_INTERFACE")));
        assert!(lines
            .iter()
            .any(|l| l.contains("sending SUCCESS for PING_INTERFACE_RSP")));
    }

    #[test]
    fn interface_control_gets_canned_response() {
        let (dispatcher, _) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();
        dispatcher.process(
            &ControlMessage::request(Command::RequestInterfaceControl),
            &mut link,
        );
        assert_eq!(link.sent[0].id, 0x8002);
    }

    #[test]
    fn shutdown_interface_stops_without_response() {
        let (dispatcher, _) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();

        let outcome = dispatcher.process(&ControlMessage::new(0xFFFF), &mut link);
        assert_eq!(outcome, Outcome::InterfaceStopped);
        assert!(link.stopped);
        assert!(link.sent.is_empty());
        assert!(dispatcher.is_active());
    }

    #[test]
    fn stub_requests_are_visible_as_unimplemented() {
        let (dispatcher, audit) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();

        for command in [
            Command::RestartSoc,
            Command::RebootEcu,
            Command::GetSocSwVersion,
            Command::GetMcuSwVersion,
            Command::GetSwitchSwVersions,
            Command::GetSocTemperature,
            Command::GetSocTemperatureLimit,
            Command::GetSocVoltage,
            Command::GetSocLimit,
        ] {
            let outcome = dispatcher.process(&ControlMessage::request(command), &mut link);
            assert_eq!(outcome, Outcome::Unimplemented(command));
        }
        assert!(link.sent.is_empty());
        assert!(audit.errors().is_empty());
    }

    #[test]
    fn unknown_id_logs_error() {
        let (dispatcher, audit) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();

        let outcome = dispatcher.process(&ControlMessage::new(0x1234), &mut link);
        assert_eq!(outcome, Outcome::Unhandled(0x1234));
        assert!(link.sent.is_empty());

        let errors = audit.errors().entries();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "Unhandled message. Id = 4660");
        assert!(audit
            .events()
            .lines()
            .iter()
            .any(|l| l.contains("processing UNKNOWN")));
    }

    #[test]
    fn app_shutdown_request_is_unhandled() {
        let (dispatcher, audit) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();

        let outcome = dispatcher.process(
            &ControlMessage::request(Command::RequestAppShutdown),
            &mut link,
        );
        assert_eq!(outcome, Outcome::Unhandled(0x0000));
        assert!(link.sent.is_empty());
        assert!(!link.stopped);

        let errors = audit.errors().entries();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text, "Unhandled message. Id = 0");
    }

    #[test]
    fn response_ids_are_unhandled() {
        let (dispatcher, audit) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink::default();

        let outcome = dispatcher.process(
            &ControlMessage::response_to(Command::PingInterface),
            &mut link,
        );
        assert_eq!(outcome, Outcome::Unhandled(0x8001));
        assert_eq!(audit.errors().len(), 1);
    }

    #[test]
    fn failed_send_is_logged_as_error() {
        let (dispatcher, audit) = dispatcher();
        dispatcher.activate();
        let mut link = MockLink {
            fail_sends: true,
            ..MockLink::default()
        };

        let outcome = dispatcher.process(
            &ControlMessage::request(Command::PingInterface),
            &mut link,
        );
        assert_eq!(
            outcome,
            Outcome::Responded {
                response: MessageId::Response(Command::PingInterface),
                sent: false
            }
        );
        let errors = audit.errors().entries();
        assert_eq!(errors[0].text, "sending FAIL for PING_INTERFACE_RSP");
    }

    #[test]
    fn deactivate_returns_to_noop() {
        let (dispatcher, _) = dispatcher();
        dispatcher.activate();
        dispatcher.deactivate();
        let mut link = MockLink::default();
        assert_eq!(
            dispatcher.process(&ControlMessage::new(0xFFFF), &mut link),
            Outcome::Ignored
        );
        assert!(!link.stopped);
    }
}
