//! Master-side bookkeeping of outstanding worker copies.

use crate::spawner::WorkerMode;
use std::process::Child;
use tracing::{debug, warn};

/// Tracks at most one outstanding worker per mode.
///
/// The spawn cycle must call [`ChildTracker::poll`] before checking
/// [`ChildTracker::can_spawn`] so that slots freed by exited workers are
/// observed. Handles are discarded once their worker exits, never reused.
#[derive(Default)]
pub struct ChildTracker {
    add: Option<Child>,
    double_halve: Option<Child>,
}

impl ChildTracker {
    /// Empty tracker, both slots free
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking liveness check of each tracked handle, freeing the
    /// slots of workers that have exited.
    pub fn poll(&mut self) {
        for mode in WorkerMode::ALL {
            Self::poll_slot(self.slot_mut(mode), mode);
        }
    }

    /// Whether a new worker of `mode` may be launched
    pub fn can_spawn(&self, mode: WorkerMode) -> bool {
        self.slot(mode).is_none()
    }

    /// Record a freshly spawned worker as the active handle for `mode`
    pub fn mark_spawned(&mut self, mode: WorkerMode, child: Child) {
        *self.slot_mut(mode) = Some(child);
    }

    fn poll_slot(slot: &mut Option<Child>, mode: WorkerMode) {
        let Some(child) = slot else { return };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(mode = mode.as_arg(), "worker exited: {status}");
                *slot = None;
            }
            Ok(None) => {} // still running
            Err(e) => {
                // A failed wait means the handle is unusable; treat the
                // worker as no longer active so the cycle can proceed.
                warn!(mode = mode.as_arg(), "wait for worker failed: {e}");
                *slot = None;
            }
        }
    }

    fn slot(&self, mode: WorkerMode) -> &Option<Child> {
        match mode {
            WorkerMode::Add => &self.add,
            WorkerMode::DoubleHalve => &self.double_halve,
        }
    }

    fn slot_mut(&mut self, mode: WorkerMode) -> &mut Option<Child> {
        match mode {
            WorkerMode::Add => &mut self.add,
            WorkerMode::DoubleHalve => &mut self.double_halve,
        }
    }
}
