//! Board-agnostic core logic for the Helmsman drive controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (motor driver, servo, clock)
//! - Controller state and the motor direction state machine
//! - Quadrature decoding shared with the encoder interrupt
//! - Motor and steering actuators with reversal protection
//! - Link watchdog and stall detection
//! - Status reporting and the controller that ties it together
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod safety;
pub mod state;
pub mod telemetry;
pub mod traits;

#[cfg(test)]
mod testing;

pub use controller::{Controller, LineOutcome, ServiceReport};
