//! Serial transmit task
//!
//! Writes queued responses and notifications to the UART, one per line.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::RESPONSE_CHANNEL;

/// Serial TX task - sends CRLF-terminated frames to the host
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let frame = RESPONSE_CHANNEL.receive().await;

        if let Err(e) = tx.write_all(frame.as_bytes()).await {
            warn!("Failed to send frame: {:?}", e);
            continue;
        }
        if let Err(e) = tx.write_all(b"\r\n").await {
            warn!("Failed to send line ending: {:?}", e);
        }
        trace!("TX: {} bytes", frame.len());
    }
}
