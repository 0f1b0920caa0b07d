//! Trailing debounce timer for auto-save.
//!
//! The timer holds at most one deadline. Arming always replaces the previous
//! deadline, so a burst of edits produces a single fire `window` after the
//! last one.

use std::time::Duration;

/// Single-slot trailing debounce timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    deadline_ms: Option<u64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            deadline_ms: None,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Cancels any pending deadline and schedules a new one from `now_ms`.
    pub fn arm(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.window_ms));
    }

    /// Drops the pending deadline. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline_ms.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Consumes the deadline when it has elapsed. Fires at most once per arm.
    pub fn fire_if_due(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
