/// Errors raised by the audit logs and label registries.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A ring buffer needs at least two slots to hold one live entry.
    #[error("invalid log capacity {capacity} (minimum {min})")]
    InvalidCapacity { capacity: usize, min: usize },

    /// No module is registered under this id.
    #[error("unknown label: module id {0}")]
    UnknownModule(u16),

    /// No domain is registered under this id.
    #[error("unknown label: domain id {0}")]
    UnknownDomain(u8),
}

pub type Result<T> = std::result::Result<T, LogError>;
