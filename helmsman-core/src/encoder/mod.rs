//! Wheel encoder tracking
//!
//! Quadrature decoding shared between the edge interrupt and the main loop.

pub mod quadrature;

pub use quadrature::{QuadratureDecoder, TICKS_PER_CYCLE};
