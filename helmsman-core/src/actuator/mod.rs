//! Actuators
//!
//! Safe wrappers over the raw motor and servo drivers: clamping, duty
//! limiting and direction-reversal protection live here so every caller
//! gets them.

pub mod motor;
pub mod steering;

pub use motor::{MotorActuator, SpeedChange, Stopping};
pub use steering::SteeringActuator;
