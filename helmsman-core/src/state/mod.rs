//! Controller state
//!
//! The direction state machine and the process-wide controller context
//! owned by the main loop.

pub mod context;
pub mod machine;

pub use context::{ControllerState, Snapshot};
pub use machine::{Direction, Transition};
