use std::io::{self, Write};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::LogConfig;
use crate::entry::{Level, LogEntry};
use crate::error::Result;
use crate::labels::ModuleId;
use crate::log::{LogKind, RingLog};

/// The event log and error log of one control server, sharing a clock.
#[derive(Debug)]
pub struct AuditLog {
    events: RingLog,
    errors: RingLog,
    clock: Arc<dyn Clock>,
}

impl AuditLog {
    /// Create both logs with a [`SystemClock`] in the configured mode.
    pub fn new(config: &LogConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock::new(config.timestamp_mode)))
    }

    pub fn with_clock(config: &LogConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            events: RingLog::new(LogKind::Event, config.event_capacity, clock.clone())?,
            errors: RingLog::new(LogKind::Error, config.error_capacity, clock.clone())?,
            clock,
        })
    }

    /// Record a routine event.
    pub fn event(&self, module: ModuleId, text: &str) {
        self.events.append(module, text, Level::Routine);
    }

    /// Record a routine error.
    pub fn error(&self, module: ModuleId, text: &str) {
        self.errors.append(module, text, Level::Routine);
    }

    /// Record an error at [`Level::Critical`].
    pub fn critical(&self, module: ModuleId, text: &str) {
        self.errors.append(module, text, Level::Critical);
    }

    pub fn events(&self) -> &RingLog {
        &self.events
    }

    pub fn errors(&self) -> &RingLog {
        &self.errors
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Both logs interleaved by timestamp, oldest first.
    ///
    /// Records with equal timestamps keep event-before-error order.
    pub fn merged(&self) -> Vec<(LogKind, LogEntry)> {
        let mut merged: Vec<(LogKind, LogEntry)> = self
            .events
            .entries()
            .into_iter()
            .map(|entry| (LogKind::Event, entry))
            .chain(
                self.errors
                    .entries()
                    .into_iter()
                    .map(|entry| (LogKind::Error, entry)),
            )
            .collect();
        merged.sort_by_key(|(_, entry)| entry.timestamp_ns);
        merged
    }

    /// Print the event log and then the error log.
    pub fn print_all(&self, out: &mut dyn Write) -> io::Result<()> {
        self.events.print_all(out)?;
        self.errors.print_all(out)
    }

    /// Print the merged view under a single header.
    pub fn print_merged(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "\n***** MERGED LOG *****")?;
        for (kind, entry) in self.merged() {
            writeln!(out, "{}", kind.render(&entry))?;
        }
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::LogError;

    fn audit() -> (AuditLog, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let config = LogConfig::default()
            .with_event_capacity(8)
            .with_error_capacity(4);
        (AuditLog::with_clock(&config, clock.clone()).unwrap(), clock)
    }

    #[test]
    fn events_and_errors_are_separate() {
        let (audit, _) = audit();
        audit.event(ModuleId::Server, "started");
        audit.error(ModuleId::Dispatcher, "Unhandled message. Id = 12");
        audit.critical(ModuleId::InterfaceManager, "bind failed");

        assert_eq!(audit.events().len(), 1);
        assert_eq!(audit.errors().len(), 2);
        assert_eq!(audit.errors().entries()[1].level, Level::Critical);
    }

    #[test]
    fn capacities_come_from_config() {
        let (audit, _) = audit();
        assert_eq!(audit.events().capacity(), 8);
        assert_eq!(audit.errors().capacity(), 4);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LogConfig::default().with_event_capacity(0);
        assert!(matches!(
            AuditLog::new(&config),
            Err(LogError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn merged_interleaves_by_timestamp() {
        let (audit, clock) = audit();
        clock.set(10);
        audit.event(ModuleId::Server, "first");
        clock.set(20);
        audit.error(ModuleId::Dispatcher, "second");
        clock.set(30);
        audit.event(ModuleId::Server, "third");

        let merged = audit.merged();
        let order: Vec<(LogKind, &str)> = merged
            .iter()
            .map(|(kind, entry)| (*kind, entry.text.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (LogKind::Event, "first"),
                (LogKind::Error, "second"),
                (LogKind::Event, "third"),
            ]
        );
    }

    #[test]
    fn print_all_emits_both_headers_in_order() {
        let (audit, _) = audit();
        audit.event(ModuleId::Server, "hello");
        let mut out = Vec::new();
        audit.print_all(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let event_at = text.find("***** EVENT LOG *****").unwrap();
        let error_at = text.find("***** ERROR LOG *****").unwrap();
        assert!(event_at < error_at);
    }
}
