//! Millisecond clock backed by the embassy time driver

use embassy_time::Instant;
use helmsman_core::traits::Clock;

/// Uptime in ms, truncated to `u32`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
