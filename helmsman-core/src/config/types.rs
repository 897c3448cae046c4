//! Controller tuning configuration
//!
//! Every timing and limit the controller enforces lives here rather than
//! in scattered constants, so tests can run with their own values and the
//! firmware can derive them from its board file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Link watchdog timeout (ms)
pub const DEFAULT_WATCHDOG_TIMEOUT_MS: u32 = 200;

/// Status line cadence (ms)
pub const DEFAULT_STATUS_INTERVAL_MS: u32 = 20;

/// Forced stop held on a direction reversal (ms)
pub const DEFAULT_REVERSAL_SETTLE_MS: u32 = 30;

/// Minimum time between stall checks (ms)
pub const DEFAULT_STALL_CHECK_INTERVAL_MS: u32 = 200;

/// Duty cap in percent
pub const DEFAULT_MAX_DUTY_PERCENT: u8 = 100;

/// Speed limits (percent, sign = direction)
pub const SPEED_MIN: i8 = -100;
pub const SPEED_MAX: i8 = 100;

/// Steering limits (degrees)
pub const STEER_MIN: u8 = 0;
pub const STEER_MAX: u8 = 180;
pub const STEER_CENTER: u8 = 90;

/// What to do when the stall monitor fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StallPolicy {
    /// Compute but do not surface stalls
    Ignore,
    /// Surface the stall to the host, keep driving
    #[default]
    Report,
    /// Surface the stall and stop the motor
    Stop,
}

/// How a direction reversal waits out the settling time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReversalPolicy {
    /// Block the caller for the settling time
    #[default]
    Blocking,
    /// Hold the motor stopped and finish the reversal from `poll()`
    Deferred,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Watchdog timeout must be non-zero
    ZeroWatchdogTimeout,
    /// Status interval must be non-zero
    ZeroStatusInterval,
    /// Stall check interval must be non-zero
    ZeroStallInterval,
    /// Duty cap must be within 1..=100
    DutyCapOutOfRange,
    /// Two roles share a pin
    PinConflict(u8),
    /// Pin number does not exist on the chip
    InvalidPin(u8),
}

/// Controller timing and limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Silence on the link longer than this stops the motor (ms)
    pub watchdog_timeout_ms: u32,
    /// Status line cadence (ms)
    pub status_interval_ms: u32,
    /// Stop hold between opposite directions (ms)
    pub reversal_settle_ms: u32,
    /// How the reversal hold is waited out
    pub reversal_policy: ReversalPolicy,
    /// Upper bound on the applied duty (percent)
    pub max_duty_percent: u8,
    /// Minimum spacing of stall checks (ms)
    pub stall_check_interval_ms: u32,
    /// Reaction to a detected stall
    pub stall_policy: StallPolicy,
    /// Emit a diagnostic line when an overlong line is discarded
    pub report_overflow: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watchdog_timeout_ms: DEFAULT_WATCHDOG_TIMEOUT_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            reversal_settle_ms: DEFAULT_REVERSAL_SETTLE_MS,
            reversal_policy: ReversalPolicy::Blocking,
            max_duty_percent: DEFAULT_MAX_DUTY_PERCENT,
            stall_check_interval_ms: DEFAULT_STALL_CHECK_INTERVAL_MS,
            stall_policy: StallPolicy::Report,
            report_overflow: false,
        }
    }
}

impl ControllerConfig {
    /// Check the configuration for values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchdog_timeout_ms == 0 {
            return Err(ConfigError::ZeroWatchdogTimeout);
        }
        if self.status_interval_ms == 0 {
            return Err(ConfigError::ZeroStatusInterval);
        }
        if self.stall_check_interval_ms == 0 {
            return Err(ConfigError::ZeroStallInterval);
        }
        if self.max_duty_percent == 0 || self.max_duty_percent > 100 {
            return Err(ConfigError::DutyCapOutOfRange);
        }
        Ok(())
    }
}

/// Clamp a requested speed into the legal range
pub fn clamp_speed(speed: i32) -> i8 {
    speed.clamp(SPEED_MIN as i32, SPEED_MAX as i32) as i8
}

/// Clamp a requested steering angle into the legal range
pub fn clamp_steer(angle: i32) -> u8 {
    angle.clamp(STEER_MIN as i32, STEER_MAX as i32) as u8
}
