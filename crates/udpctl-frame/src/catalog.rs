//! Message id catalog.
//!
//! Request ids occupy `0x0000..=0x000B`. Every request has a response id equal
//! to `request | 0x8000`. `0xFFFF` is the standalone interface shutdown
//! command, which has no response.

use crate::error::{FrameError, Result};

/// Bit set on every response id.
pub const RESPONSE_FLAG: u16 = 0x8000;

/// Raw id of the interface shutdown command.
pub const SHUTDOWN_INTERFACE: u16 = 0xFFFF;

/// Request commands understood by the control interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    RequestAppShutdown = 0x00,
    PingInterface = 0x01,
    RequestInterfaceControl = 0x02,
    RestartSoc = 0x03,
    RebootEcu = 0x04,
    GetSocSwVersion = 0x05,
    GetMcuSwVersion = 0x06,
    GetSwitchSwVersions = 0x07,
    GetSocTemperature = 0x08,
    GetSocTemperatureLimit = 0x09,
    GetSocVoltage = 0x0A,
    GetSocLimit = 0x0B,
}

impl Command {
    /// Every command, in id order.
    pub const ALL: [Command; 12] = [
        Command::RequestAppShutdown,
        Command::PingInterface,
        Command::RequestInterfaceControl,
        Command::RestartSoc,
        Command::RebootEcu,
        Command::GetSocSwVersion,
        Command::GetMcuSwVersion,
        Command::GetSwitchSwVersions,
        Command::GetSocTemperature,
        Command::GetSocTemperatureLimit,
        Command::GetSocVoltage,
        Command::GetSocLimit,
    ];

    /// Look up a command by its request code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Raw request id.
    pub fn request_id(self) -> u16 {
        self as u16
    }

    /// Raw response id (`request | 0x8000`).
    pub fn response_id(self) -> u16 {
        self as u16 | RESPONSE_FLAG
    }

    pub fn request_name(self) -> &'static str {
        match self {
            Command::RequestAppShutdown => "REQUEST_APP_SHUTDOWN",
            Command::PingInterface => "PING_INTERFACE",
            Command::RequestInterfaceControl => "REQUEST_INTERFACE_CONTROL",
            Command::RestartSoc => "RESTART_SOC",
            Command::RebootEcu => "REBOOT_ECU",
            Command::GetSocSwVersion => "GET_SOC_SW_VERSION",
            Command::GetMcuSwVersion => "GET_MCU_SW_VERSION",
            Command::GetSwitchSwVersions => "GET_SWITCH_SW_VERSIONS",
            Command::GetSocTemperature => "GET_SOC_TEMPERATURE",
            Command::GetSocTemperatureLimit => "GET_SOC_TEMPERATURE_LIMIT",
            Command::GetSocVoltage => "GET_SOC_VOLTAGE",
            Command::GetSocLimit => "GET_SOC_LIMIT",
        }
    }

    pub fn response_name(self) -> &'static str {
        match self {
            Command::RequestAppShutdown => "REQUEST_APP_SHUTDOWN_RSP",
            Command::PingInterface => "PING_INTERFACE_RSP",
            Command::RequestInterfaceControl => "REQUEST_INTERFACE_CONTROL_RSP",
            Command::RestartSoc => "RESTART_SOC_RSP",
            Command::RebootEcu => "REBOOT_ECU_RSP",
            Command::GetSocSwVersion => "GET_SOC_SW_VERSION_RSP",
            Command::GetMcuSwVersion => "GET_MCU_SW_VERSION_RSP",
            Command::GetSwitchSwVersions => "GET_SWITCH_SW_VERSIONS_RSP",
            Command::GetSocTemperature => "GET_SOC_TEMPERATURE_RSP",
            Command::GetSocTemperatureLimit => "GET_SOC_TEMPERATURE_LIMIT_RSP",
            Command::GetSocVoltage => "GET_SOC_VOLTAGE_RSP",
            Command::GetSocLimit => "GET_SOC_LIMIT_RSP",
        }
    }
}

/// A catalogued message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Request(Command),
    Response(Command),
    ShutdownInterface,
}

impl MessageId {
    /// Resolve a raw wire id. Returns `None` for ids outside the catalog.
    pub fn from_raw(id: u16) -> Option<Self> {
        if id == SHUTDOWN_INTERFACE {
            return Some(MessageId::ShutdownInterface);
        }
        if id & RESPONSE_FLAG != 0 {
            Command::from_code(id & !RESPONSE_FLAG).map(MessageId::Response)
        } else {
            Command::from_code(id).map(MessageId::Request)
        }
    }

    /// Raw wire id.
    pub fn raw(self) -> u16 {
        match self {
            MessageId::Request(command) => command.request_id(),
            MessageId::Response(command) => command.response_id(),
            MessageId::ShutdownInterface => SHUTDOWN_INTERFACE,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MessageId::Request(command) => command.request_name(),
            MessageId::Response(command) => command.response_name(),
            MessageId::ShutdownInterface => "SHUTDOWN_INTERFACE",
        }
    }
}

impl TryFrom<u16> for MessageId {
    type Error = FrameError;

    fn try_from(id: u16) -> Result<Self> {
        Self::from_raw(id).ok_or(FrameError::UnknownMessageId(id))
    }
}

impl From<MessageId> for u16 {
    fn from(id: MessageId) -> Self {
        id.raw()
    }
}

/// Returns the human-readable name for a raw message id.
pub fn message_name(id: u16) -> Result<&'static str> {
    MessageId::try_from(id).map(MessageId::name)
}

/// Returns true if the id carries the response flag (the shutdown id excluded).
pub fn is_response(id: u16) -> bool {
    id != SHUTDOWN_INTERFACE && id & RESPONSE_FLAG != 0
}

/// Returns true if the id appears in the catalog.
pub fn is_catalogued(id: u16) -> bool {
    MessageId::from_raw(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_response_ids_pair_up() {
        for command in Command::ALL {
            assert_eq!(command.response_id(), command.request_id() | 0x8000);
            assert_eq!(
                MessageId::from_raw(command.request_id()),
                Some(MessageId::Request(command))
            );
            assert_eq!(
                MessageId::from_raw(command.response_id()),
                Some(MessageId::Response(command))
            );
        }
    }

    #[test]
    fn catalog_codes_match_wire_values() {
        assert_eq!(Command::RequestAppShutdown.request_id(), 0x00);
        assert_eq!(Command::PingInterface.request_id(), 0x01);
        assert_eq!(Command::RequestInterfaceControl.request_id(), 0x02);
        assert_eq!(Command::GetSocLimit.request_id(), 0x0B);
        assert_eq!(Command::PingInterface.response_id(), 0x8001);
    }

    #[test]
    fn shutdown_interface_is_standalone() {
        assert_eq!(
            MessageId::from_raw(0xFFFF),
            Some(MessageId::ShutdownInterface)
        );
        assert_eq!(message_name(0xFFFF).unwrap(), "SHUTDOWN_INTERFACE");
        assert!(!is_response(0xFFFF));
    }

    #[test]
    fn names_resolve_for_catalogued_ids() {
        assert_eq!(message_name(0x0001).unwrap(), "PING_INTERFACE");
        assert_eq!(message_name(0x8001).unwrap(), "PING_INTERFACE_RSP");
        assert_eq!(message_name(0x000A).unwrap(), "GET_SOC_VOLTAGE");
    }

    #[test]
    fn unknown_ids_fail_lookup() {
        for id in [0x000C, 0x00FF, 0x800C, 0x7FFF, 0xFFFE] {
            assert!(matches!(
                message_name(id),
                Err(FrameError::UnknownMessageId(got)) if got == id
            ));
            assert!(!is_catalogued(id));
        }
    }

    #[test]
    fn raw_roundtrips_through_u16() {
        let id = MessageId::Response(Command::GetSocTemperature);
        assert_eq!(u16::from(id), 0x8008);
        assert_eq!(MessageId::try_from(0x8008).unwrap(), id);
    }
}
