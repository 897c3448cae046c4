//! Stall detection
//!
//! A driven motor whose encoder tally has not moved between two checks is
//! considered stalled. Checks are rate limited so a slow wheel still has
//! time to produce an edge.

/// Outcome of a stall check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StallCheck {
    /// Too soon since the last check, or the motor is not commanded to run
    Skipped,
    /// The encoder moved since the last check
    Moving,
    /// The encoder did not move; `first` marks the start of an episode
    Stalled { first: bool },
}

/// Encoder progress watcher
#[derive(Debug, Clone)]
pub struct StallMonitor {
    interval_ms: u32,
    last_check_ms: u32,
    last_ticks: i32,
    stalled: bool,
}

impl StallMonitor {
    /// Create a monitor whose first check is due `interval_ms` after `now_ms`
    pub fn new(interval_ms: u32, now_ms: u32, ticks: i32) -> Self {
        Self {
            interval_ms,
            last_check_ms: now_ms,
            last_ticks: ticks,
            stalled: false,
        }
    }

    /// Whether the current episode is latched
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Compare the tally against the previous check
    ///
    /// A stopped motor skips the check and re-arms the episode latch, so
    /// the next stall while driving is reported again. The reference moves
    /// along while stopped: the first check after a start comes a full
    /// interval later, against the tally the motor started from.
    pub fn check(&mut self, now_ms: u32, ticks: i32, motor_running: bool) -> StallCheck {
        if !motor_running {
            self.stalled = false;
            self.last_check_ms = now_ms;
            self.last_ticks = ticks;
            return StallCheck::Skipped;
        }

        if now_ms.wrapping_sub(self.last_check_ms) < self.interval_ms {
            return StallCheck::Skipped;
        }

        self.last_check_ms = now_ms;
        let unchanged = ticks == self.last_ticks;
        self.last_ticks = ticks;

        if unchanged {
            let first = !self.stalled;
            self.stalled = true;
            StallCheck::Stalled { first }
        } else {
            self.stalled = false;
            StallCheck::Moving
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited() {
        let mut monitor = StallMonitor::new(200, 0, 0);
        assert_eq!(monitor.check(0, 0, true), StallCheck::Skipped);
        assert_eq!(monitor.check(199, 0, true), StallCheck::Skipped);
        assert_eq!(monitor.check(200, 5, true), StallCheck::Moving);
        assert_eq!(monitor.check(350, 5, true), StallCheck::Skipped);
    }

    #[test]
    fn test_motor_not_running_skips() {
        let mut monitor = StallMonitor::new(200, 0, 0);
        assert_eq!(monitor.check(1000, 0, false), StallCheck::Skipped);
        // Starting after a long idle gets a full interval to move
        assert_eq!(monitor.check(1000, 0, true), StallCheck::Skipped);
        assert_eq!(monitor.check(1199, 0, true), StallCheck::Skipped);
        assert_eq!(monitor.check(1200, 0, true), StallCheck::Stalled { first: true });
    }

    #[test]
    fn test_idle_ticks_are_not_progress() {
        let mut monitor = StallMonitor::new(200, 0, 0);
        // Wheel pushed by hand while stopped
        monitor.check(500, 40, false);
        assert_eq!(monitor.check(700, 40, true), StallCheck::Stalled { first: true });
    }

    #[test]
    fn test_stall_episode_latches() {
        let mut monitor = StallMonitor::new(200, 0, 10);
        assert_eq!(monitor.check(200, 10, true), StallCheck::Stalled { first: true });
        assert!(monitor.is_stalled());
        assert_eq!(monitor.check(400, 10, true), StallCheck::Stalled { first: false });

        // Progress re-arms
        assert_eq!(monitor.check(600, 14, true), StallCheck::Moving);
        assert!(!monitor.is_stalled());
        assert_eq!(monitor.check(800, 14, true), StallCheck::Stalled { first: true });
    }

    #[test]
    fn test_stop_rearms() {
        let mut monitor = StallMonitor::new(200, 0, 0);
        assert_eq!(monitor.check(200, 0, true), StallCheck::Stalled { first: true });
        monitor.check(300, 0, false);
        assert!(!monitor.is_stalled());
        assert_eq!(monitor.check(400, 0, true), StallCheck::Skipped);
        assert_eq!(monitor.check(500, 0, true), StallCheck::Stalled { first: true });
    }

    #[test]
    fn test_reference_updates_on_each_check() {
        let mut monitor = StallMonitor::new(200, 0, 0);
        assert_eq!(monitor.check(200, 3, true), StallCheck::Moving);
        assert_eq!(monitor.check(400, 3, true), StallCheck::Stalled { first: true });
    }

    #[test]
    fn test_across_clock_wrap() {
        let start = u32::MAX - 50;
        let mut monitor = StallMonitor::new(200, start, 0);
        assert_eq!(monitor.check(start.wrapping_add(199), 0, true), StallCheck::Skipped);
        assert_eq!(
            monitor.check(start.wrapping_add(200), 0, true),
            StallCheck::Stalled { first: true }
        );
    }
}
