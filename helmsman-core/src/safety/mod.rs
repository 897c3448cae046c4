//! Safety monitoring
//!
//! Link watchdog and encoder stall detection. Both are pure evaluators:
//! they report what they see and leave actuation to the controller.

pub mod stall;
pub mod watchdog;

pub use stall::{StallCheck, StallMonitor};
pub use watchdog::{Watchdog, WatchdogCheck};
