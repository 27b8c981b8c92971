use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::clock::{format_timestamp, Clock};
use crate::entry::{
    fixed_width, truncate, Level, LogEntry, ERROR_TEXT_WIDTH, EVENT_TEXT_WIDTH, LEVEL_WIDTH,
    MODULE_WIDTH, TIMESTAMP_WIDTH,
};
use crate::error::Result;
use crate::labels::ModuleId;
use crate::ring::RingBuffer;

/// Which audit stream a [`RingLog`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Event,
    Error,
}

impl LogKind {
    pub fn name(self) -> &'static str {
        match self {
            LogKind::Event => "event",
            LogKind::Error => "error",
        }
    }

    /// Marker written between the module and text columns.
    pub fn label(self) -> &'static str {
        match self {
            LogKind::Event => "EVNT: ",
            LogKind::Error => "ERRR: ",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            LogKind::Event => "***** EVENT LOG *****",
            LogKind::Error => "***** ERROR LOG *****",
        }
    }

    pub fn text_width(self) -> usize {
        match self {
            LogKind::Event => EVENT_TEXT_WIDTH,
            LogKind::Error => ERROR_TEXT_WIDTH,
        }
    }

    /// Width of a rendered line. Only error lines carry a level column.
    pub fn line_width(self) -> usize {
        let level = match self {
            LogKind::Event => 0,
            LogKind::Error => LEVEL_WIDTH,
        };
        TIMESTAMP_WIDTH + MODULE_WIDTH + self.label().len() + self.text_width() + level
    }

    /// Render one record as a fixed-width line.
    pub fn render(self, entry: &LogEntry) -> String {
        let mut line = String::with_capacity(self.line_width());
        line.push_str(&fixed_width(
            &format_timestamp(entry.timestamp_ns),
            TIMESTAMP_WIDTH,
        ));
        line.push_str(&fixed_width(entry.module.name(), MODULE_WIDTH));
        line.push_str(self.label());
        line.push_str(&fixed_width(&entry.text, self.text_width()));
        if self == LogKind::Error {
            line.push_str(&fixed_width(&entry.level.to_string(), LEVEL_WIDTH));
        }
        line
    }
}

/// Mutex-guarded ring of audit records.
#[derive(Debug)]
pub struct RingLog {
    kind: LogKind,
    clock: Arc<dyn Clock>,
    ring: Mutex<RingBuffer<LogEntry>>,
}

impl RingLog {
    pub fn new(kind: LogKind, capacity: usize, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            kind,
            clock,
            ring: Mutex::new(RingBuffer::new(capacity)?),
        })
    }

    /// Record `text` for `module`, overwriting the oldest record when full.
    pub fn append(&self, module: ModuleId, text: &str, level: Level) {
        let mut ring = self.lock();
        let entry = LogEntry {
            timestamp_ns: self.clock.now_ns(),
            module,
            text: truncate(text, self.kind.text_width()),
            level,
        };
        debug!(
            log = self.kind.name(),
            module = module.name(),
            level = level.as_u8(),
            "{}",
            entry.text
        );
        ring.push(entry);
    }

    /// Live records, oldest first.
    ///
    /// The log stays locked while the snapshot is alive, so appends from
    /// other threads wait until it is dropped.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot { ring: self.lock() }
    }

    /// Owned copy of the live records.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.snapshot().to_vec()
    }

    /// Rendered lines of the live records. Does not clear the log.
    pub fn lines(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|entry| self.kind.render(entry))
            .collect()
    }

    /// Write the header followed by every live record.
    pub fn print_all(&self, out: &mut dyn Write) -> io::Result<()> {
        let snapshot = self.snapshot();
        writeln!(out, "\n{}", self.kind.header())?;
        for entry in snapshot.iter() {
            writeln!(out, "{}", self.kind.render(entry))?;
        }
        writeln!(out)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn kind(&self) -> LogKind {
        self.kind
    }

    fn lock(&self) -> MutexGuard<'_, RingBuffer<LogEntry>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only view of a [`RingLog`] holding its lock.
pub struct Snapshot<'a> {
    ring: MutexGuard<'a, RingBuffer<LogEntry>>,
}

impl Snapshot<'_> {
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.ring.iter()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.ring.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::clock::ManualClock;

    fn log_with(kind: LogKind, capacity: usize) -> (RingLog, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let log = RingLog::new(kind, capacity, clock.clone()).unwrap();
        (log, clock)
    }

    #[test]
    fn append_stamps_with_clock() {
        let (log, clock) = log_with(LogKind::Event, 8);
        clock.set(1_500);
        log.append(ModuleId::Dispatcher, "processing PING_INTERFACE", Level::Routine);

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].timestamp_ns, 1_500);
        assert_eq!(entries[0].module, ModuleId::Dispatcher);
        assert_eq!(entries[0].text, "processing PING_INTERFACE");
    }

    #[test]
    fn text_is_cut_to_column_width() {
        let (log, _) = log_with(LogKind::Error, 4);
        log.append(ModuleId::Server, &"x".repeat(100), Level::Critical);
        assert_eq!(log.entries()[0].text.len(), ERROR_TEXT_WIDTH);
    }

    #[test]
    fn rendered_line_is_fixed_width() {
        let (log, clock) = log_with(LogKind::Event, 4);
        clock.set(3_000_000_000);
        log.append(ModuleId::InterfaceManager, "started", Level::Routine);

        let line = &log.lines()[0];
        assert!(line.starts_with("00000:00:00:03::000::000 us"));
        assert_eq!(
            line.chars().count(),
            TIMESTAMP_WIDTH + MODULE_WIDTH + 6 + EVENT_TEXT_WIDTH
        );
        let label_at = TIMESTAMP_WIDTH + MODULE_WIDTH;
        assert_eq!(&line[TIMESTAMP_WIDTH..TIMESTAMP_WIDTH + 17], "INTERFACE MANAGER");
        assert_eq!(&line[label_at..label_at + 13], "EVNT: started");
        assert!(line.ends_with(' '), "event lines have no level column");
    }

    #[test]
    fn error_line_ends_with_level() {
        let (log, _) = log_with(LogKind::Error, 4);
        log.append(ModuleId::Server, "start FAIL", Level::Critical);

        let line = &log.lines()[0];
        assert_eq!(
            line.chars().count(),
            TIMESTAMP_WIDTH + MODULE_WIDTH + 6 + ERROR_TEXT_WIDTH + LEVEL_WIDTH
        );
        assert_eq!(LogKind::Error.line_width(), line.chars().count());
        let level_at = line.len() - LEVEL_WIDTH;
        assert_eq!(&line[level_at..], "2  ");
    }

    #[derive(Debug, Default)]
    struct TickClock(std::sync::atomic::AtomicU64);

    impl Clock for TickClock {
        fn now_ns(&self) -> u64 {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[test]
    fn concurrent_appends_keep_timestamp_order() {
        let clock = Arc::new(TickClock::default());
        let log = Arc::new(RingLog::new(LogKind::Event, 512, clock).unwrap());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        log.append(ModuleId::Server, "tick", Level::Routine);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let stamps: Vec<u64> = log.entries().iter().map(|e| e.timestamp_ns).collect();
        assert_eq!(stamps.len(), 400);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn print_all_writes_header_and_entries() {
        let (log, _) = log_with(LogKind::Error, 4);
        log.append(ModuleId::Dispatcher, "Unhandled message. Id = 32769", Level::Routine);

        let mut out = Vec::new();
        log.print_all(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("***** ERROR LOG *****"));
        assert!(text.contains("ERRR: Unhandled message. Id = 32769"));
        assert_eq!(log.len(), 1, "printing must not clear the log");
    }

    #[test]
    fn snapshot_is_ordered_oldest_first() {
        let (log, clock) = log_with(LogKind::Event, 3);
        for text in ["a", "b", "c"] {
            clock.advance(1);
            log.append(ModuleId::Server, text, Level::Routine);
        }
        let snapshot = log.snapshot();
        let texts: Vec<&str> = snapshot.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn survives_poisoned_lock() {
        let (log, _) = log_with(LogKind::Event, 4);
        let log = Arc::new(log);
        let poisoner = log.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.ring.lock().unwrap();
            panic!("poison the ring");
        })
        .join();

        log.append(ModuleId::Server, "still logging", Level::Routine);
        assert_eq!(log.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_drain_is_idempotent(texts in proptest::collection::vec("[a-z]{0,12}", 0..40)) {
            let (log, _) = log_with(LogKind::Event, 16);
            for text in &texts {
                log.append(ModuleId::External, text, Level::Routine);
            }
            let first = log.lines();
            let second = log.lines();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), texts.len().min(15));
        }
    }
}
