//! Host telemetry task
//!
//! Reports the latest block features to the host as one text line per
//! analysis block. Frames the link cannot keep up with are skipped.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::TELEMETRY;

/// Telemetry TX task - writes the most recent frame
#[embassy_executor::task]
pub async fn telemetry_task(mut tx: BufferedUartTx) {
    info!("Telemetry task started");

    loop {
        let frame = TELEMETRY.wait().await;

        match frame.to_line() {
            Ok(line) => {
                if let Err(e) = tx.write_all(line.as_bytes()).await {
                    warn!("Failed to send telemetry: {:?}", e);
                }
            }
            Err(e) => warn!("Failed to encode telemetry: {:?}", e),
        }
    }
}
