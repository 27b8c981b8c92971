//! Module and domain label registries.
//!
//! Ids identify which component is acting or affected. They only label log
//! records and never influence routing.

use std::fmt;

use crate::error::{LogError, Result};

/// Components that write to the audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ModuleId {
    /// Process lifecycle owner.
    Server = 0x0000,
    InterfaceManager = 0x0001,
    Dispatcher = 0x0002,
    /// Anything outside the control server.
    External = 0x0004,
    /// Broadcast target covering every module.
    All = 0xFFFF,
}

impl ModuleId {
    pub const ALL_MODULES: [ModuleId; 5] = [
        ModuleId::Server,
        ModuleId::InterfaceManager,
        ModuleId::Dispatcher,
        ModuleId::External,
        ModuleId::All,
    ];

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            ModuleId::Server => "CONTROL SERVER",
            ModuleId::InterfaceManager => "INTERFACE MANAGER",
            ModuleId::Dispatcher => "PROTOCOL DISPATCHER",
            ModuleId::External => "NON SYSTEM MODULE",
            ModuleId::All => "ALL SYSTEM MODULES",
        }
    }
}

impl TryFrom<u16> for ModuleId {
    type Error = LogError;

    fn try_from(id: u16) -> Result<Self> {
        Self::ALL_MODULES
            .into_iter()
            .find(|module| module.id() == id)
            .ok_or(LogError::UnknownModule(id))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Functional domains of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DomainId {
    Global = 0,
    IoNetwork = 1,
    Protocol = 2,
    AllDomains = 16,
}

impl DomainId {
    pub const ALL_DOMAINS: [DomainId; 4] = [
        DomainId::Global,
        DomainId::IoNetwork,
        DomainId::Protocol,
        DomainId::AllDomains,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            DomainId::Global => "GL",
            DomainId::IoNetwork => "IO",
            DomainId::Protocol => "PR",
            DomainId::AllDomains => "ALL DOMAINS",
        }
    }
}

impl TryFrom<u8> for DomainId {
    type Error = LogError;

    fn try_from(id: u8) -> Result<Self> {
        Self::ALL_DOMAINS
            .into_iter()
            .find(|domain| domain.id() == id)
            .ok_or(LogError::UnknownDomain(id))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label for a raw module id.
pub fn module_name(id: u16) -> Result<&'static str> {
    ModuleId::try_from(id).map(ModuleId::name)
}

/// Label for a raw domain id.
pub fn domain_name(id: u8) -> Result<&'static str> {
    DomainId::try_from(id).map(DomainId::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_labels_resolve() {
        assert_eq!(module_name(0).unwrap(), "CONTROL SERVER");
        assert_eq!(module_name(2).unwrap(), "PROTOCOL DISPATCHER");
        assert_eq!(module_name(0xFFFF).unwrap(), "ALL SYSTEM MODULES");
    }

    #[test]
    fn unknown_module_is_an_error() {
        assert!(matches!(module_name(3), Err(LogError::UnknownModule(3))));
        let err = module_name(0x1234).unwrap_err();
        assert!(err.to_string().contains("unknown label"));
    }

    #[test]
    fn domain_labels_resolve() {
        assert_eq!(domain_name(0).unwrap(), "GL");
        assert_eq!(domain_name(1).unwrap(), "IO");
        assert_eq!(domain_name(2).unwrap(), "PR");
        assert_eq!(domain_name(16).unwrap(), "ALL DOMAINS");
        assert!(matches!(domain_name(15), Err(LogError::UnknownDomain(15))));
    }
}
