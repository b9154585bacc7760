//! Master control loop and the console input task.
//!
//! The scheduler polls three independent timers every [`POLL_INTERVAL`]:
//! the fast counter tick, the status line, and the worker spawn cycle.
//! All three may fire in the same poll tick. The cross-process mutex is
//! held only for single read-modify-write critical sections, never across
//! a sleep or a spawn.
//!
//! Concurrently, a dedicated thread reads integer values from the console
//! and applies them as guarded `counter = value` assignments. The thread
//! blocks on stdin indefinitely, which is acceptable because it runs
//! independently of the timer loop; it therefore holds only a `Weak`
//! reference to the region, so a master shutting down can still unlink it.

use crate::consts::{POLL_INTERVAL, SPAWN_INTERVAL, STATUS_INTERVAL, TICK_INTERVAL};
use crate::logger::{EventLog, now_string};
use crate::spawner::{self, WorkerMode};
use crate::tracker::ChildTracker;
use counterd_shm::{CounterRegion, platform};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Master-only periodic driver of the shared counter.
pub struct Scheduler {
    region: Arc<CounterRegion>,
    log: EventLog,
    tracker: ChildTracker,
    exe: PathBuf,
    running: Arc<AtomicBool>,
    last_tick: Instant,
    last_status: Instant,
    last_spawn: Instant,
}

impl Scheduler {
    /// Create a scheduler whose timers start counting from now
    pub fn new(
        region: Arc<CounterRegion>,
        log: EventLog,
        exe: PathBuf,
        running: Arc<AtomicBool>,
    ) -> Self {
        let now = Instant::now();
        Self {
            region,
            log,
            tracker: ChildTracker::new(),
            exe,
            running,
            last_tick: now,
            last_status: now,
            last_spawn: now,
        }
    }

    /// Poll loop; returns once the running flag clears.
    pub fn run(&mut self) {
        info!("scheduler running (pid {})", platform::current_pid());
        while self.running.load(Ordering::SeqCst) {
            self.tick(Instant::now());
            thread::sleep(POLL_INTERVAL);
        }
        info!("scheduler stopped");
    }

    /// Check every timer against `now`; each fires independently.
    fn tick(&mut self, now: Instant) {
        if now.duration_since(self.last_tick) >= TICK_INTERVAL {
            self.last_tick = now;
            self.increment_counter();
        }

        if now.duration_since(self.last_status) >= STATUS_INTERVAL {
            self.last_status = now;
            self.log_status();
        }

        if now.duration_since(self.last_spawn) >= SPAWN_INTERVAL {
            self.last_spawn = now;
            self.spawn_cycle();
        }
    }

    fn increment_counter(&self) {
        match self.region.with_lock(|c| {
            *c += 1;
            *c
        }) {
            Ok(value) => self.log.append(
                "DEBUG",
                &format!(
                    "PID={} incremented counter to {value}",
                    platform::current_pid()
                ),
            ),
            Err(e) => error!("counter tick skipped: {e}"),
        }
    }

    fn log_status(&self) {
        match self.region.with_lock(|c| *c) {
            Ok(value) => self.log.append(
                "MASTER",
                &format!(
                    "{} PID={}, counter={value}",
                    now_string(),
                    platform::current_pid()
                ),
            ),
            Err(e) => error!("status read skipped: {e}"),
        }
    }

    /// Launch the worker pair, or skip the whole cycle if either previous
    /// worker is still running.
    fn spawn_cycle(&mut self) {
        self.tracker.poll();

        let busy = WorkerMode::ALL
            .iter()
            .any(|mode| !self.tracker.can_spawn(*mode));
        if busy {
            self.log.append(
                "MASTER",
                &format!(
                    "{} previous workers still running, skipping spawn",
                    now_string()
                ),
            );
            return;
        }

        let mut spawned_all = true;
        for mode in WorkerMode::ALL {
            match spawner::spawn_worker(&self.exe, mode) {
                Ok(child) => self.tracker.mark_spawned(mode, child),
                Err(e) => {
                    warn!(mode = mode.as_arg(), "failed to spawn worker: {e}");
                    spawned_all = false;
                }
            }
        }

        // A half-spawned pair is logged as an overall failure; the tracker
        // reconciles the launched half on a later poll.
        if spawned_all {
            self.log.append("MASTER", "launched workers 1 and 2");
        } else {
            self.log.append("MASTER", "failed to launch workers");
        }
    }
}

/// Parse a console line as a counter value. Empty and non-numeric lines
/// are rejected.
pub fn parse_counter_value(line: &str) -> Option<i64> {
    line.trim().parse().ok()
}

/// Start the console input task.
///
/// Each accepted line sets the counter under the guard and logs the
/// change; malformed lines are reported and the task keeps waiting for
/// the next one. The task ends when stdin closes, the running flag
/// clears, or the region is gone.
pub fn spawn_input_listener(
    region: Weak<CounterRegion>,
    log_path: PathBuf,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console-input".into())
        .spawn(move || input_loop(region, log_path, running))
}

fn input_loop(region: Weak<CounterRegion>, log_path: PathBuf, running: Arc<AtomicBool>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("console input closed: {e}");
                break;
            }
        };

        let Some(value) = parse_counter_value(&line) else {
            warn!("invalid input {line:?}: enter an integer counter value");
            continue;
        };

        let Some(region) = region.upgrade() else { break };
        let log = EventLog::new(Arc::clone(&region), log_path.clone());
        match region.with_lock(|c| *c = value) {
            Ok(()) => log.append(
                "USER",
                &format!(
                    "counter set to {value} | PID={} | time={}",
                    platform::current_pid(),
                    now_string()
                ),
            ),
            Err(e) => error!("counter set skipped: {e}"),
        }
    }
    debug!("console input task exiting");
}
