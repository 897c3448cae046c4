//! Quadrature decoder
//!
//! Every edge on either encoder channel calls [`QuadratureDecoder::on_edge`]
//! with both channel levels. The 2-bit code `A<<1 | B` is combined with
//! the previous code into a 4-bit transition index and looked up in a
//! fixed table: four transitions count +1, four count −1, and the rest
//! (no change, or both channels flipping at once because an edge was
//! missed) leave the tally alone.
//!
//! Forward rotation walks the codes `00 → 10 → 11 → 01 → 00`, i.e.
//! [`TICKS_PER_CYCLE`] counts per full quadrature cycle.
//!
//! # Concurrency contract
//!
//! There is no lock. The decoder is shared between exactly two contexts
//! on one core:
//!
//! - the edge handler, which is the only writer of both fields during
//!   normal operation and runs at interrupt priority, so its
//!   load-then-store of the tally can never be interleaved by the main loop;
//! - the main loop, which only reads the tally ([`count`]) and occasionally
//!   zeroes it ([`reset`]) with a single store.
//!
//! The tally is published with `Release` stores and read with `Acquire`
//! loads so a reader never observes a torn or stale-beyond-one-edge value.
//! Because nothing needs a hardware read-modify-write, this works on
//! cores without atomic RMW instructions (Cortex-M0+). The contract does
//! not hold if two edge handlers for the same decoder can run
//! concurrently, e.g. on two cores.
//!
//! [`count`]: QuadratureDecoder::count
//! [`reset`]: QuadratureDecoder::reset

use portable_atomic::{AtomicI32, AtomicU8, Ordering};

/// Counts per full quadrature cycle (four edges)
pub const TICKS_PER_CYCLE: i32 = 4;

/// Tally change for each `previous << 2 | current` transition
const TRANSITIONS: [i8; 16] = [
    0,  // 00 -> 00
    -1, // 00 -> 01
    1,  // 00 -> 10
    0,  // 00 -> 11 (missed edge)
    1,  // 01 -> 00
    0,  // 01 -> 01
    0,  // 01 -> 10 (missed edge)
    -1, // 01 -> 11
    -1, // 10 -> 00
    0,  // 10 -> 01 (missed edge)
    0,  // 10 -> 10
    1,  // 10 -> 11
    0,  // 11 -> 00 (missed edge)
    1,  // 11 -> 01
    -1, // 11 -> 10
    0,  // 11 -> 11
];

/// Interrupt-safe quadrature tally
#[derive(Debug)]
pub struct QuadratureDecoder {
    count: AtomicI32,
    last_code: AtomicU8,
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadratureDecoder {
    /// Create a decoder with a zero tally, suitable for a `static`
    pub const fn new() -> Self {
        Self {
            count: AtomicI32::new(0),
            last_code: AtomicU8::new(0),
        }
    }

    /// Encode the two channel levels
    #[inline]
    fn code(a: bool, b: bool) -> u8 {
        ((a as u8) << 1) | (b as u8)
    }

    /// Seed the previous code from the current pin levels
    ///
    /// Call once before enabling edge interrupts so the first edge is
    /// judged against the real idle state instead of `00`.
    pub fn prime(&self, a: bool, b: bool) {
        self.last_code.store(Self::code(a, b), Ordering::Relaxed);
    }

    /// Edge handler: fold the new channel levels into the tally
    ///
    /// Must only be called from the single edge context (see the module
    /// docs).
    pub fn on_edge(&self, a: bool, b: bool) {
        let current = Self::code(a, b);
        let previous = self.last_code.load(Ordering::Relaxed);
        let delta = TRANSITIONS[(((previous << 2) | current) & 0x0F) as usize];

        if delta != 0 {
            let count = self.count.load(Ordering::Acquire);
            self.count
                .store(count.wrapping_add(delta as i32), Ordering::Release);
        }

        self.last_code.store(current, Ordering::Relaxed);
    }

    /// Current tally
    pub fn count(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }

    /// Zero the tally
    pub fn reset(&self) {
        self.count.store(0, Ordering::Release);
    }
}
