//! Bounded audit logs for the udpctl control server.
//!
//! Two ring logs share one contract and differ only in capacity and label:
//! the event log (200 slots by default) and the error log (100 slots).
//! Appends never grow a log; once full, each append drops the oldest record.
//! Records are only surfaced on demand through snapshots and printouts.

pub mod audit;
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod labels;
pub mod log;
pub mod ring;

pub use audit::AuditLog;
pub use clock::{format_timestamp, Clock, ManualClock, SystemClock, TimestampMode};
pub use config::{LogConfig, DEFAULT_ERROR_CAPACITY, DEFAULT_EVENT_CAPACITY};
pub use entry::{fixed_width, Level, LogEntry};
pub use error::{LogError, Result};
pub use labels::{domain_name, module_name, DomainId, ModuleId};
pub use log::{LogKind, RingLog, Snapshot};
pub use ring::RingBuffer;
