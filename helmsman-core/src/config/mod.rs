//! Configuration types
//!
//! Board-agnostic configuration structures handed to the controller at
//! initialization. Firmware builds fill them from compile-time constants.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
