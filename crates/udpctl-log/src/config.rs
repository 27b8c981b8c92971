use crate::clock::TimestampMode;
use crate::error::{LogError, Result};
use crate::ring::MIN_CAPACITY;

/// Default event log slot count.
pub const DEFAULT_EVENT_CAPACITY: usize = 200;

/// Default error log slot count.
pub const DEFAULT_ERROR_CAPACITY: usize = 100;

/// Sizing and clock settings for an [`AuditLog`](crate::AuditLog).
///
/// Capacities count slots. A ring keeps at most `capacity - 1` live entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub event_capacity: usize,
    pub error_capacity: usize,
    pub timestamp_mode: TimestampMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            error_capacity: DEFAULT_ERROR_CAPACITY,
            timestamp_mode: TimestampMode::SinceStart,
        }
    }
}

impl LogConfig {
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    pub fn with_timestamp_mode(mut self, mode: TimestampMode) -> Self {
        self.timestamp_mode = mode;
        self
    }

    /// Reject capacities that cannot hold a single entry.
    pub fn validate(&self) -> Result<()> {
        for capacity in [self.event_capacity, self.error_capacity] {
            if capacity < MIN_CAPACITY {
                return Err(LogError::InvalidCapacity {
                    capacity,
                    min: MIN_CAPACITY,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sizes() {
        let config = LogConfig::default();
        assert_eq!(config.event_capacity, 200);
        assert_eq!(config.error_capacity, 100);
        assert_eq!(config.timestamp_mode, TimestampMode::SinceStart);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tiny_capacity_is_rejected() {
        let config = LogConfig::default().with_error_capacity(1);
        assert!(matches!(
            config.validate(),
            Err(LogError::InvalidCapacity { capacity: 1, min: 2 })
        ));
    }
}
