//! MUSTEM Display Firmware
//!
//! Firmware for the display board (RP2040 + 320x240 ILI9341 TFT).
//! Receives the line-oriented command stream over UART and renders the
//! winding, wave and spectrum layers.

#![no_std]
#![no_main]

mod channels;
mod tasks;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use mustem_display::{DisplayBackend, Scene, SceneConfig};
use mustem_drivers::display::{Ili9341, Orientation};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Serial link speed
const BAUD_RATE: u32 = 115_200;

/// TFT SPI clock
const SPI_FREQUENCY_HZ: u32 = 40_000_000;

// Static cells for UART buffers (must live forever)
// The RX buffer holds a full winding burst while the renderer catches up
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 2048]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MUSTEM display firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Setup SPI for the TFT (GPIO18=SCK, GPIO19=MOSI, GPIO17=CS, GPIO16=DC, GPIO20=RST)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY_HZ;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let mut rst = Output::new(p.PIN_20, Level::High);

    // Hardware reset pulse
    rst.set_low();
    Timer::after_millis(10).await;
    rst.set_high();
    Timer::after_millis(120).await;

    let mut panel = Ili9341::new(spi, dc, cs, Orientation::Landscape);
    match panel.init(&mut Delay) {
        Ok(()) => {
            let size = panel.pixel_dimensions();
            info!("TFT initialized ({}x{})", size.width, size.height);
        }
        Err(e) => error!("Failed to initialize TFT: {:?}", e),
    }

    // Setup UART for the command link (GPIO0=TX, GPIO1=RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; 2048]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, rx) = uart.split();

    info!("UART initialized at {} baud", BAUD_RATE);

    let scene = Scene::new(SceneConfig::default());

    // Spawn tasks
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::render_task(scene, panel)).unwrap();

    info!("All tasks spawned, display running");

    loop {
        Timer::after_secs(60).await;
        debug!(
            "Dropped lines: {}",
            channels::DROPPED_LINES.load(portable_atomic::Ordering::Relaxed)
        );
    }
}
