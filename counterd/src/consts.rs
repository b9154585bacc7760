//! Well-known names and timing constants.
//!
//! These are the single source of truth for the coordinator's shared
//! resource names and scheduler periods. The names are process-wide
//! constants, not configurable per invocation: every instance of the
//! program must land on the same region and the same log file.

use std::time::Duration;

/// Name of the shared counter region. There is exactly one region
/// system-wide; the backing file lives under `/dev/shm/`.
pub const REGION_NAME: &str = "counter";

/// Shared append-only event log, one line per event. All processes append
/// to the same file under the cross-process mutex.
pub const LOG_FILE: &str = "counterd.log";

/// Fast counter tick: the master increments the counter at this period.
pub const TICK_INTERVAL: Duration = Duration::from_millis(300);

/// Status period: the master logs a timestamp/pid/counter line.
pub const STATUS_INTERVAL: Duration = Duration::from_millis(1000);

/// Spawn-cycle period: the master launches the worker pair, subject to
/// throttling.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(3000);

/// Scheduler poll interval; all timers are checked at this granularity.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Pause a mode-2 worker takes between doubling and halving the counter,
/// with no lock held.
pub const DOUBLE_HALVE_PAUSE: Duration = Duration::from_millis(2000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_is_finer_than_every_timer() {
        assert!(POLL_INTERVAL < TICK_INTERVAL);
        assert!(TICK_INTERVAL < STATUS_INTERVAL);
        assert!(STATUS_INTERVAL < SPAWN_INTERVAL);
    }

    #[test]
    fn test_reference_periods() {
        assert_eq!(TICK_INTERVAL.as_millis(), 300);
        assert_eq!(STATUS_INTERVAL.as_millis(), 1000);
        assert_eq!(SPAWN_INTERVAL.as_millis(), 3000);
        assert_eq!(DOUBLE_HALVE_PAUSE.as_millis(), 2000);
    }
}
