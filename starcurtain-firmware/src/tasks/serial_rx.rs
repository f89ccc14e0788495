//! Serial receive task
//!
//! Reassembles `!!...##` frames from the UART byte stream and queues them
//! for the animation task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use starcurtain_protocol::{LineAssembler, LineError};

use crate::channels::COMMAND_CHANNEL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - assembles frames and forwards them
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut assembler = LineAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match assembler.feed(byte) {
                        Ok(Some(frame)) => {
                            if COMMAND_CHANNEL.try_send(frame).is_err() {
                                warn!("Command channel full, dropping frame");
                            }
                        }
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(LineError::Overflow) => {
                            warn!("Frame too long, discarded");
                        }
                        Err(e) => {
                            warn!("Frame error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
