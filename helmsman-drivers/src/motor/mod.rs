//! Motor driver implementations
//!
//! - Phase/enable H-bridge: one PWM enable input, one direction input

pub mod phase_enable;

pub use phase_enable::PhaseEnableMotor;
