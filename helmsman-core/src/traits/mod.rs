//! Hardware abstraction traits
//!
//! These traits define the interface between the controller logic and
//! hardware-specific implementations. Blocking delays use
//! [`embedded_hal::delay::DelayNs`] directly.

pub mod clock;
pub mod motor;
pub mod servo;

pub use clock::Clock;
pub use motor::{ActuatorError, MotorDriver};
pub use servo::ServoDriver;
