//! Periodic status reports
//!
//! Emits one [`StatusReport`] per interval from a controller snapshot.
//! The interval is measured from the previous emission, not from a fixed
//! grid, so a late loop pass delays the schedule instead of bunching
//! reports together.

use helmsman_protocol::StatusReport;

use crate::state::Snapshot;

/// Status line scheduler
#[derive(Debug, Clone)]
pub struct StatusReporter {
    interval_ms: u32,
    last_emit_ms: u32,
}

impl StatusReporter {
    /// First report is due `interval_ms` after `now_ms`
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            interval_ms,
            last_emit_ms: now_ms,
        }
    }

    /// Time of the last emission (ms)
    pub fn last_emit_ms(&self) -> u32 {
        self.last_emit_ms
    }

    /// Produce a report if the interval has elapsed
    pub fn poll(&mut self, now_ms: u32, snapshot: &Snapshot) -> Option<StatusReport> {
        if now_ms.wrapping_sub(self.last_emit_ms) < self.interval_ms {
            return None;
        }
        self.last_emit_ms = now_ms;
        Some(StatusReport {
            encoder: snapshot.encoder,
            speed: snapshot.speed,
            steer: snapshot.steer,
        })
    }
}
