//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in helmsman-core on top of `embedded-hal` 1.0 PWM and GPIO:
//!
//! - Motor drivers (phase/enable H-bridge)
//! - Steering servos (hobby servo on a 50 Hz PWM channel)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod motor;
pub mod servo;

/// Hardware failure while updating an output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// PWM channel rejected the duty cycle
    Pwm,
    /// GPIO write failed
    Pin,
}
