//! Save scheduling: a quiet-window debounce and a periodic interval feeding
//! one pending slot.
//!
//! The scheduler never sleeps. Callers report edits with
//! [`SaveScheduler::notify_change`] and drive it with [`SaveScheduler::poll`]
//! from their event loop, which keeps it deterministic under test.

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Which timer asked for the save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// Edits went quiet for the debounce window.
    Debounce,
    /// The periodic interval elapsed with edits still pending.
    Interval,
}

/// Tracks pending changes and decides when a save is due.
#[derive(Debug)]
pub struct SaveScheduler {
    enabled: bool,
    debounce: Duration,
    interval: Duration,
    /// Unsaved changes exist
    pending: bool,
    /// A save was handed out by `poll` and not yet completed
    in_flight: bool,
    /// Changes arrived while a save was in flight
    changed_in_flight: bool,
    debounce_deadline: Option<Instant>,
    interval_deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(debounce: Duration, interval: Duration) -> Self {
        Self {
            enabled: true,
            debounce,
            interval,
            pending: false,
            in_flight: false,
            changed_in_flight: false,
            debounce_deadline: None,
            interval_deadline: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether unsaved changes are waiting.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Enable or disable scheduling. Disabling cancels both timers; pending
    /// changes are remembered and rescheduled on the first poll after
    /// re-enabling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.debounce_deadline = None;
            self.interval_deadline = None;
        }
    }

    /// Change timer durations. Running timers keep their deadlines.
    pub fn set_timings(&mut self, debounce: Duration, interval: Duration) {
        self.debounce = debounce;
        self.interval = interval;
    }

    /// Record an edit. Restarts the quiet window and starts the interval
    /// timer if it is not running.
    pub fn notify_change(&mut self, now: Instant) {
        if !self.enabled {
            // Remembered, but no timer runs while disabled
            self.pending = true;
            return;
        }
        self.pending = true;
        if self.in_flight {
            self.changed_in_flight = true;
        }
        self.debounce_deadline = Some(now + self.debounce);
        if self.interval_deadline.is_none() {
            self.interval_deadline = Some(now + self.interval);
        }
    }

    /// Return the trigger that is due, if any.
    ///
    /// At most one trigger is returned per poll, and none while a previous
    /// save is still in flight. The caller must report the outcome with
    /// [`SaveScheduler::complete`].
    pub fn poll(&mut self, now: Instant) -> Option<SaveTrigger> {
        if !self.enabled || !self.pending || self.in_flight {
            return None;
        }

        if self.debounce_deadline.is_none() && self.interval_deadline.is_none() {
            // Pending changes with no timer, e.g. after re-enabling
            self.debounce_deadline = Some(now + self.debounce);
            self.interval_deadline = Some(now + self.interval);
            return None;
        }

        let trigger = if self.debounce_deadline.is_some_and(|d| d <= now) {
            SaveTrigger::Debounce
        } else if self.interval_deadline.is_some_and(|d| d <= now) {
            SaveTrigger::Interval
        } else {
            return None;
        };

        self.in_flight = true;
        self.changed_in_flight = false;
        self.debounce_deadline = None;
        self.interval_deadline = Some(now + self.interval);
        Some(trigger)
    }

    /// Report the outcome of a save, polled or manual.
    ///
    /// A failed save leaves the changes pending so the next trigger retries.
    pub fn complete(&mut self, success: bool) {
        let changed = self.changed_in_flight;
        self.in_flight = false;
        self.changed_in_flight = false;

        if success && !changed {
            self.pending = false;
            self.debounce_deadline = None;
            self.interval_deadline = None;
        } else if !success {
            self.pending = true;
        }
    }

    /// Earliest instant at which `poll` may return a trigger.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.enabled || !self.pending || self.in_flight {
            return None;
        }
        match (self.debounce_deadline, self.interval_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_INTERVAL)
    }
}
