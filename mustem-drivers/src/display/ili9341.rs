//! ILI9341 TFT Display Driver
//!
//! Driver for 240x320 ILI9341 panels over SPI in 16-bit RGB565 mode.
//! The panel owns the bus: chip select is asserted at init and held.
//! Pixels go straight to controller RAM through an address window, so there
//! is no frame buffer and `flush()` has nothing to do.

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::{ContainsPoint, Rectangle};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use mustem_display::{DisplayBackend, DisplayError};

/// Native panel dimensions (portrait)
const NATIVE_WIDTH: u32 = 240;
const NATIVE_HEIGHT: u32 = 320;

/// Pixels per SPI write when streaming a solid color
const CHUNK_PIXELS: usize = 32;

/// ILI9341 commands
#[allow(dead_code)]
mod cmd {
    pub const SOFTWARE_RESET: u8 = 0x01;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDR: u8 = 0x2A;
    pub const PAGE_ADDR: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MEMORY_ACCESS: u8 = 0x36;
    pub const PIXEL_FORMAT: u8 = 0x3A;
    pub const FRAME_RATE: u8 = 0xB1;
    pub const DISPLAY_FUNCTION: u8 = 0xB6;
    pub const POWER_1: u8 = 0xC0;
    pub const POWER_2: u8 = 0xC1;
    pub const VCOM_1: u8 = 0xC5;
    pub const VCOM_2: u8 = 0xC7;
    pub const GAMMA_SET: u8 = 0x26;
}

/// Memory access control bits
mod madctl {
    pub const MY: u8 = 0x80;
    pub const MX: u8 = 0x40;
    pub const MV: u8 = 0x20;
    pub const BGR: u8 = 0x08;
}

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    Portrait,
    /// 320x240 with the connector on the left
    #[default]
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
}

impl Orientation {
    fn madctl(self) -> u8 {
        match self {
            Orientation::Portrait => madctl::MX | madctl::BGR,
            Orientation::Landscape => madctl::MV | madctl::BGR,
            Orientation::PortraitFlipped => madctl::MY | madctl::BGR,
            Orientation::LandscapeFlipped => madctl::MX | madctl::MY | madctl::MV | madctl::BGR,
        }
    }

    fn size(self) -> Size {
        match self {
            Orientation::Portrait | Orientation::PortraitFlipped => {
                Size::new(NATIVE_WIDTH, NATIVE_HEIGHT)
            }
            Orientation::Landscape | Orientation::LandscapeFlipped => {
                Size::new(NATIVE_HEIGHT, NATIVE_WIDTH)
            }
        }
    }
}

/// ILI9341 driver
pub struct Ili9341<SPI, DC, CS> {
    spi: SPI,
    /// Data/command select (low = command)
    dc: DC,
    /// Chip select (active low)
    cs: CS,
    orientation: Orientation,
    initialized: bool,
}

impl<SPI, DC, CS> Ili9341<SPI, DC, CS>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
{
    /// Create a new ILI9341 driver
    pub fn new(spi: SPI, dc: DC, cs: CS, orientation: Orientation) -> Self {
        Self {
            spi,
            dc,
            cs,
            orientation,
            initialized: false,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Initialize the panel
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError> {
        self.initialized = false;
        self.cs.set_low().map_err(|_| DisplayError::Pin)?;

        self.command(cmd::SOFTWARE_RESET, &[])?;
        delay.delay_ms(120);

        self.command(cmd::POWER_1, &[0x23])?;
        self.command(cmd::POWER_2, &[0x10])?;
        self.command(cmd::VCOM_1, &[0x3E, 0x28])?;
        self.command(cmd::VCOM_2, &[0x86])?;
        self.command(cmd::MEMORY_ACCESS, &[self.orientation.madctl()])?;
        self.command(cmd::PIXEL_FORMAT, &[0x55])?; // 16 bits per pixel
        self.command(cmd::FRAME_RATE, &[0x00, 0x18])?;
        self.command(cmd::DISPLAY_FUNCTION, &[0x08, 0x82, 0x27])?;
        self.command(cmd::GAMMA_SET, &[0x01])?;

        self.command(cmd::SLEEP_OUT, &[])?;
        delay.delay_ms(120);
        self.command(cmd::DISPLAY_ON, &[])?;

        self.initialized = true;
        Ok(())
    }

    /// Change orientation (takes effect immediately)
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), DisplayError> {
        self.orientation = orientation;
        if self.initialized {
            self.command(cmd::MEMORY_ACCESS, &[orientation.madctl()])?;
        }
        Ok(())
    }

    /// Turn display output on/off
    pub fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if on {
            self.command(cmd::DISPLAY_ON, &[])
        } else {
            self.command(cmd::DISPLAY_OFF, &[])
        }
    }

    /// Deselect the panel and give back the bus and pins
    pub fn release(mut self) -> (SPI, DC, CS) {
        let _ = self.cs.set_high();
        (self.spi, self.dc, self.cs)
    }

    fn ensure_ready(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }

    /// Send a command followed by its parameters
    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.write(&[command])?;
        if !params.is_empty() {
            self.data(params)?;
        }
        Ok(())
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::Pin)?;
        self.write(bytes)
    }

    /// Write and wait until the bytes are on the wire, so DC can change
    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi
            .write(bytes)
            .and_then(|()| self.spi.flush())
            .map_err(|_| DisplayError::Communication)
    }

    /// Select the inclusive RAM window and start a memory write
    fn set_window(&mut self, top_left: Point, bottom_right: Point) -> Result<(), DisplayError> {
        let [x0h, x0l] = (top_left.x as u16).to_be_bytes();
        let [x1h, x1l] = (bottom_right.x as u16).to_be_bytes();
        let [y0h, y0l] = (top_left.y as u16).to_be_bytes();
        let [y1h, y1l] = (bottom_right.y as u16).to_be_bytes();
        self.command(cmd::COLUMN_ADDR, &[x0h, x0l, x1h, x1l])?;
        self.command(cmd::PAGE_ADDR, &[y0h, y0l, y1h, y1l])?;
        self.command(cmd::MEMORY_WRITE, &[])
    }

    /// Stream `count` pixels of one color into the current window
    fn write_color(&mut self, color: Rgb565, count: u32) -> Result<(), DisplayError> {
        let [hi, lo] = color.into_storage().to_be_bytes();
        let mut chunk = [0u8; CHUNK_PIXELS * 2];
        for pair in chunk.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }

        let mut remaining = count as usize;
        while remaining > 0 {
            let pixels = remaining.min(CHUNK_PIXELS);
            self.data(&chunk[..pixels * 2])?;
            remaining -= pixels;
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.orientation.size())
    }
}

impl<SPI, DC, CS> DisplayBackend for Ili9341<SPI, DC, CS>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
{
    fn fill_screen(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.fill_rect(self.bounds(), color)
    }

    fn draw_pixel(&mut self, point: Point, color: Rgb565) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if !self.bounds().contains(point) {
            return Ok(());
        }
        self.set_window(point, point)?;
        self.write_color(color, 1)
    }

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        let clipped = area.intersection(&self.bounds());
        let Some(bottom_right) = clipped.bottom_right() else {
            return Ok(());
        };
        self.set_window(clipped.top_left, bottom_right)?;
        self.write_color(color, clipped.size.width * clipped.size.height)
    }

    fn pixel_dimensions(&self) -> Size {
        self.orientation.size()
    }

    fn is_ready(&self) -> bool {
        self.initialized
    }
}
