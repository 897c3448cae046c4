//! Compile-time controller configuration
//!
//! The constants come from controller.toml via build.rs; this module turns
//! them into the core's configuration types.

use helmsman_core::config::{ControllerConfig, ReversalPolicy, StallPolicy};
use helmsman_drivers::servo::ServoConfig;

include!(concat!(env!("OUT_DIR"), "/config_gen.rs"));

/// RP2040 system clock after `embassy_rp::init` defaults
pub const SYS_CLOCK_HZ: u32 = 125_000_000;

/// Servo frame rate
pub const SERVO_FRAME_HZ: u32 = 50;

/// Servo settle times from the power-on sequence (ms)
pub const SERVO_IDLE_MS: u64 = 50;
pub const SERVO_CENTER_MS: u64 = 100;

/// Controller tunables
pub fn controller_config() -> ControllerConfig {
    ControllerConfig {
        watchdog_timeout_ms: WATCHDOG_TIMEOUT_MS,
        status_interval_ms: STATUS_INTERVAL_MS,
        reversal_settle_ms: REVERSAL_SETTLE_MS,
        reversal_policy: REVERSAL_POLICY,
        max_duty_percent: MAX_DUTY_PERCENT,
        stall_check_interval_ms: STALL_CHECK_INTERVAL_MS,
        stall_policy: STALL_POLICY,
        report_overflow: REPORT_OVERFLOW,
    }
}

/// Steering servo pulse timing
pub fn servo_config() -> ServoConfig {
    ServoConfig {
        min_pulse_us: SERVO_MIN_PULSE_US,
        max_pulse_us: SERVO_MAX_PULSE_US,
        period_us: (1_000_000 / SERVO_FRAME_HZ) as u16,
    }
}
