//! Embassy async tasks
//!
//! The link task owns the controller and runs the main loop on the thread
//! executor. The encoder task runs on a higher-priority interrupt executor
//! so edges are counted even while the link task is busy.

pub mod diag;
pub mod encoder;
pub mod link;

pub use diag::diag_tx_task;
pub use encoder::encoder_task;
pub use link::link_task;
