//! Test displays

extern crate std;

use std::vec;
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::backend::{DisplayBackend, DisplayError};

/// A recorded display operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    FillScreen(Rgb565),
    Pixel(Point, Rgb565),
    Rect(Rectangle, Rgb565),
    Flush,
}

/// Records every primitive it receives
///
/// Lines go through the trait's default so they show up as pixels.
pub struct RecordingDisplay {
    pub ops: Vec<Op>,
    size: Size,
}

impl RecordingDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ops: Vec::new(),
            size: Size::new(width, height),
        }
    }

    pub fn rects(&self) -> Vec<(Rectangle, Rgb565)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Rect(r, c) => Some((*r, *c)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl DisplayBackend for RecordingDisplay {
    fn fill_screen(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.ops.push(Op::FillScreen(color));
        Ok(())
    }

    fn draw_pixel(&mut self, point: Point, color: Rgb565) -> Result<(), DisplayError> {
        self.ops.push(Op::Pixel(point, color));
        Ok(())
    }

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        self.ops.push(Op::Rect(area, color));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::Flush);
        Ok(())
    }

    fn pixel_dimensions(&self) -> Size {
        self.size
    }
}

/// In-memory RGB565 frame buffer
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, background: Rgb565) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.index(Point::new(x, y)).map(|i| self.pixels[i])
    }

    /// Number of pixels that differ from `color`
    pub fn count_not(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|p| **p != color).count()
    }

    /// Number of pixels of `color` inside a column range
    pub fn count_in_columns(&self, x0: i32, x1: i32, color: Rgb565) -> usize {
        let mut count = 0;
        for y in 0..self.height as i32 {
            for x in x0..x1 {
                if self.pixel(x, y) == Some(color) {
                    count += 1;
                }
            }
        }
        count
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width as i32 || p.y >= self.height as i32 {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }
}

impl DisplayBackend for FrameBuffer {
    fn fill_screen(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.pixels.fill(color);
        Ok(())
    }

    fn draw_pixel(&mut self, point: Point, color: Rgb565) -> Result<(), DisplayError> {
        if let Some(i) = self.index(point) {
            self.pixels[i] = color;
        }
        Ok(())
    }

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        for y in 0..area.size.height as i32 {
            for x in 0..area.size.width as i32 {
                let p = Point::new(area.top_left.x + x, area.top_left.y + y);
                if let Some(i) = self.index(p) {
                    self.pixels[i] = color;
                }
            }
        }
        Ok(())
    }

    fn pixel_dimensions(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
