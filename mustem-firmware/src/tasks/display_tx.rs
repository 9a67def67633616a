//! Display UART transmit task
//!
//! Encodes planned commands as text lines for the display board.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::COMMANDS;

/// Display TX task - writes one line per command
#[embassy_executor::task]
pub async fn display_tx_task(mut tx: BufferedUartTx) {
    info!("Display TX task started");

    let mut sent: u32 = 0;

    loop {
        let cmd = COMMANDS.receive().await;

        let line = match cmd.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode {:?}: {:?}", cmd, e);
                continue;
            }
        };

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send command: {:?}", e);
            continue;
        }

        sent = sent.wrapping_add(1);
        if cmd.clears_screen() {
            debug!("{} commands sent", sent);
        }
    }
}
