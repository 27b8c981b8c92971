//! Nanosecond time sources and timestamp rendering.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const NS_PER_US: u64 = 1_000;
const NS_PER_MS: u64 = 1_000_000;
const NS_PER_SEC: u64 = 1_000_000_000;
const NS_PER_MIN: u64 = 60 * NS_PER_SEC;
const NS_PER_HOUR: u64 = 60 * NS_PER_MIN;
const NS_PER_DAY: u64 = 24 * NS_PER_HOUR;

/// Source of log timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in nanoseconds.
    fn now_ns(&self) -> u64;
}

/// Origin of [`SystemClock`] timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampMode {
    /// Nanoseconds since the clock was created.
    #[default]
    SinceStart,
    /// Nanoseconds since the Unix epoch.
    Epoch,
}

/// Production clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    mode: TimestampMode,
    start: Instant,
}

impl SystemClock {
    pub fn new(mode: TimestampMode) -> Self {
        Self {
            mode,
            start: Instant::now(),
        }
    }

    pub fn mode(&self) -> TimestampMode {
        self.mode
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(TimestampMode::SinceStart)
    }
}

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        let elapsed = match self.mode {
            TimestampMode::SinceStart => self.start.elapsed(),
            TimestampMode::Epoch => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        };
        u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ns: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ns),
        }
    }

    pub fn set(&self, ns: u64) {
        self.now.store(ns, Ordering::SeqCst);
    }

    pub fn advance(&self, ns: u64) {
        self.now.fetch_add(ns, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Render nanoseconds as `DDDDD:HH:MM:SS::mmm::uuu us`.
///
/// Sub-microsecond precision is dropped.
pub fn format_timestamp(ns: u64) -> String {
    let days = ns / NS_PER_DAY;
    let hours = (ns % NS_PER_DAY) / NS_PER_HOUR;
    let mins = (ns % NS_PER_HOUR) / NS_PER_MIN;
    let secs = (ns % NS_PER_MIN) / NS_PER_SEC;
    let millis = (ns % NS_PER_SEC) / NS_PER_MS;
    let micros = (ns % NS_PER_MS) / NS_PER_US;
    format!("{days:05}:{hours:02}:{mins:02}:{secs:02}::{millis:03}::{micros:03} us")
}
