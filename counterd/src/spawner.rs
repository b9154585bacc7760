//! Detached worker process launching.

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// Operation a spawned worker copy performs against the shared counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMode {
    /// Add 10 to the counter
    Add,
    /// Double the counter, pause 2 s unlocked, then halve it
    DoubleHalve,
}

impl WorkerMode {
    /// Both modes, in spawn order
    pub const ALL: [WorkerMode; 2] = [WorkerMode::Add, WorkerMode::DoubleHalve];

    /// Parse the `--child` argument value
    pub fn from_arg(value: u8) -> Option<Self> {
        match value {
            1 => Some(WorkerMode::Add),
            2 => Some(WorkerMode::DoubleHalve),
            _ => None,
        }
    }

    /// The `--child` argument value for this mode
    pub fn as_arg(self) -> &'static str {
        match self {
            WorkerMode::Add => "1",
            WorkerMode::DoubleHalve => "2",
        }
    }

    /// Tag used in event-log lines
    pub fn tag(self) -> &'static str {
        match self {
            WorkerMode::Add => "COPY1",
            WorkerMode::DoubleHalve => "COPY2",
        }
    }
}

/// Launch a detached copy of `exe` running one worker operation.
///
/// Builds `exe --child <mode>` and returns as soon as the OS confirms
/// process creation; the caller tracks completion via the returned handle.
/// The copy re-runs the full program, sees `--child`, skips election, and
/// attaches as a slave.
pub fn spawn_worker(exe: &Path, mode: WorkerMode) -> io::Result<Child> {
    let child = Command::new(exe)
        .arg("--child")
        .arg(mode.as_arg())
        .stdin(Stdio::null())
        .spawn()?;
    debug!(
        mode = mode.as_arg(),
        pid = child.id(),
        "spawned worker copy"
    );
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_arg_round_trip() {
        assert_eq!(WorkerMode::from_arg(1), Some(WorkerMode::Add));
        assert_eq!(WorkerMode::from_arg(2), Some(WorkerMode::DoubleHalve));
        assert_eq!(WorkerMode::from_arg(0), None);
        assert_eq!(WorkerMode::from_arg(3), None);

        for mode in WorkerMode::ALL {
            let arg: u8 = mode.as_arg().parse().unwrap();
            assert_eq!(WorkerMode::from_arg(arg), Some(mode));
        }
    }

    #[test]
    fn test_spawn_order_is_mode1_then_mode2() {
        assert_eq!(WorkerMode::ALL[0], WorkerMode::Add);
        assert_eq!(WorkerMode::ALL[1], WorkerMode::DoubleHalve);
    }

    #[test]
    fn test_spawn_missing_executable_fails() {
        let result = spawn_worker(Path::new("/nonexistent/counterd"), WorkerMode::Add);
        assert!(result.is_err());
    }
}
