//! Serial receive task
//!
//! Accumulates bytes into lines and parses them into commands. Bad lines
//! are logged and dropped; the link carries on with the next line.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use mustem_protocol::{Command, LineReader};

use crate::channels::{count_dropped, COMMANDS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - receives and parses command lines from the host
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut reader = LineReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for result in reader.lines(&buf[..n]) {
                    let line = match result {
                        Ok(line) => line,
                        Err(e) => {
                            let dropped = count_dropped();
                            warn!("Dropped line: {:?} ({} total)", e, dropped);
                            continue;
                        }
                    };

                    match Command::parse(&line) {
                        Ok(cmd) => COMMANDS.send(cmd).await,
                        Err(e) => {
                            count_dropped();
                            trace!("Ignored line '{}': {:?}", line.as_str(), e);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
                reader.reset();
            }
        }
    }
}
