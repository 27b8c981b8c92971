use std::fmt;

use crate::labels::ModuleId;

/// Column width of the rendered timestamp column.
pub const TIMESTAMP_WIDTH: usize = 29;
/// Column width of the module name column.
pub const MODULE_WIDTH: usize = 59;
/// Column width of event text.
pub const EVENT_TEXT_WIDTH: usize = 69;
/// Column width of error text.
pub const ERROR_TEXT_WIDTH: usize = 39;
/// Column width of the level column.
pub const LEVEL_WIDTH: usize = 3;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    #[default]
    Routine = 1,
    Critical = 2,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One audit record.
///
/// `text` is already cut to the owning log's text width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp_ns: u64,
    pub module: ModuleId,
    pub text: String,
    pub level: Level,
}

/// Left-justify `s` in exactly `width` characters, truncating if longer.
pub fn fixed_width(s: &str, width: usize) -> String {
    format!("{s:<width$.width$}")
}

/// Cut `s` to at most `width` characters.
pub(crate) fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}
