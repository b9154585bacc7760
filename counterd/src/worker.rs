//! Worker copy operations.
//!
//! A worker performs exactly one operation against the shared counter,
//! logs its start and end in the shared event log, and exits. Mode 2's
//! pause deliberately happens with no lock held: the doubled value is
//! observable by the master and other workers for the whole window.

use crate::consts::DOUBLE_HALVE_PAUSE;
use crate::logger::{EventLog, now_string};
use crate::spawner::WorkerMode;
use counterd_shm::{CounterRegion, platform};
use std::thread;
use tracing::error;

/// Run one worker operation.
///
/// Lock failures are recoverable: the step is skipped and reported, and
/// the worker still writes its end line.
pub fn run_worker(region: &CounterRegion, log: &EventLog, mode: WorkerMode) {
    let pid = platform::current_pid();
    let tag = mode.tag();
    log.append(tag, &format!("Start: PID={pid}, time={}", now_string()));

    let end_value = match mode {
        WorkerMode::Add => apply_guarded(region, |c| *c += 10),
        WorkerMode::DoubleHalve => {
            let _ = apply_guarded(region, |c| *c *= 2);
            thread::sleep(DOUBLE_HALVE_PAUSE);
            apply_guarded(region, |c| *c /= 2)
        }
    };

    match end_value {
        Some(value) => log.append(
            tag,
            &format!("End: PID={pid}, time={}, counter={value}", now_string()),
        ),
        None => log.append(tag, &format!("End: PID={pid}, time={}", now_string())),
    }
}

/// Apply one guarded mutation, returning the resulting counter value, or
/// `None` if acquisition failed and the mutation was skipped.
fn apply_guarded(region: &CounterRegion, f: impl FnOnce(&mut i64)) -> Option<i64> {
    match region.with_lock(|c| {
        f(c);
        *c
    }) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("counter operation skipped: {e}");
            None
        }
    }
}
