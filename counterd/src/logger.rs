//! Shared append-only event log.
//!
//! One text file, one line per event, written by every process in the
//! system. Writes are serialized by the region's cross-process mutex, so
//! line ordering across processes is whatever order writers acquire the
//! lock in. The file is opened in append mode per write and never
//! truncated by this core.

use counterd_shm::CounterRegion;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

/// Current local time formatted for log lines, millisecond precision
pub fn now_string() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Handle to the shared event log.
///
/// Cloneable; all clones append to the same file under the same mutex.
/// Callers must not hold a `CounterLock` while appending; the log takes
/// the same mutex.
#[derive(Clone)]
pub struct EventLog {
    region: Arc<CounterRegion>,
    path: PathBuf,
}

impl EventLog {
    /// Create a handle appending to `path`, serialized via `region`'s mutex
    pub fn new(region: Arc<CounterRegion>, path: impl Into<PathBuf>) -> Self {
        Self {
            region,
            path: path.into(),
        }
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `[TAG] message` line.
    ///
    /// Logging failures are never fatal: lock, open, and write errors go
    /// to the diagnostic stream and the call returns without effect.
    pub fn append(&self, tag: &str, message: &str) {
        let _guard = match self.region.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("event log: lock failed: {e}");
                return;
            }
        };

        let mut file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) => {
                error!("event log: cannot open {}: {e}", self.path.display());
                return;
            }
        };

        if let Err(e) = writeln!(file, "[{tag}] {message}").and_then(|()| file.flush()) {
            error!("event log: write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counterd_shm::platform;

    fn test_region(suffix: &str) -> Arc<CounterRegion> {
        let name = format!("log_test_{}_{suffix}", platform::current_pid());
        Arc::new(CounterRegion::create_exclusive(&name).expect("create region"))
    }

    #[test]
    fn test_append_writes_tagged_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let log = EventLog::new(test_region("tag"), &*path);

        log.append("MAIN", "Start: PID=1");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[MAIN] Start: PID=1\n");
    }

    #[test]
    fn test_append_grows_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let log = EventLog::new(test_region("grow"), &*path);

        log.append("MASTER", "first");
        log.append("COPY1", "second");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["[MASTER] first", "[COPY1] second"]);
    }

    #[test]
    fn test_unwritable_path_is_not_fatal() {
        let log = EventLog::new(test_region("unwritable"), "/nonexistent-dir/events.log");
        // Must report and return, not panic or propagate.
        log.append("MAIN", "dropped");
    }

    #[test]
    fn test_timestamp_has_millisecond_precision() {
        let stamp = now_string();
        // "YYYY-MM-DD HH:MM:SS.mmm"
        assert_eq!(stamp.len(), 23);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[19..20], ".");
    }
}
