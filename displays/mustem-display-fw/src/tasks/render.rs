//! Render task
//!
//! Owns the scene and the panel. Commands are applied as they arrive;
//! between commands the animation updaters run on a ticker at the
//! shortest updater interval.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Duration, Instant, Ticker};

use mustem_display::Scene;
use mustem_drivers::display::Ili9341;

use crate::channels::COMMANDS;

/// The TFT as wired on the display board
pub type Panel = Ili9341<Spi<'static, SPI0, Blocking>, Output<'static>, Output<'static>>;

/// Milliseconds since boot on a wrapping clock
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Render task - applies commands and animates the scene
#[embassy_executor::task]
pub async fn render_task(mut scene: Scene, mut panel: Panel) {
    info!("Render task started");

    if let Err(e) = scene.init(&mut panel) {
        error!("Scene init failed: {:?}", e);
    }

    let interval = scene.tick_interval_ms().max(1) as u64;
    let mut ticker = Ticker::every(Duration::from_millis(interval));

    loop {
        match select(COMMANDS.receive(), ticker.next()).await {
            Either::First(cmd) => {
                trace!("Command: {:?}", cmd);
                if let Err(e) = scene.apply(&cmd, now_ms(), &mut panel) {
                    warn!("Failed to apply command: {:?}", e);
                }
            }
            Either::Second(()) => {
                if let Err(e) = scene.tick(now_ms(), &mut panel) {
                    warn!("Animation tick failed: {:?}", e);
                }
            }
        }
    }
}
