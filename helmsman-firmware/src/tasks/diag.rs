//! Diagnostics UART transmit task
//!
//! Drains queued diagnostic lines to UART1 so the link task never waits on
//! the debug port.

use defmt::*;
use embassy_rp::uart::{Blocking, UartTx};

use crate::channels::DIAG_CHANNEL;

/// Diagnostics TX task
#[embassy_executor::task]
pub async fn diag_tx_task(mut tx: UartTx<'static, Blocking>) {
    info!("Diagnostics TX task started");

    loop {
        let line = DIAG_CHANNEL.receive().await;
        if let Err(e) = tx.blocking_write(line.as_bytes()) {
            warn!("Diagnostics UART write error: {:?}", e);
        }
    }
}
