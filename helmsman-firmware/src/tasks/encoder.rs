//! Encoder edge task
//!
//! Waits for an edge on either channel and feeds both levels to the shared
//! decoder. Runs on the interrupt executor: it preempts the link task,
//! including a blocking reversal hold, and is the decoder's only writer.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;

use crate::channels::ENCODER;

/// Encoder edge task
#[embassy_executor::task]
pub async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>) {
    info!("Encoder task started");

    ENCODER.prime(a.is_high(), b.is_high());

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        // Keep decoding while the levels move under us so a quick second
        // edge is not lost before the next wait is armed
        loop {
            let (level_a, level_b) = (a.is_high(), b.is_high());
            ENCODER.on_edge(level_a, level_b);
            if (a.is_high(), b.is_high()) == (level_a, level_b) {
                break;
            }
        }
    }
}
