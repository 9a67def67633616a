//! Display backend trait
//!
//! Defines the pixel operations the scene needs from a TFT.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, PointsIter, Size};
use embedded_graphics::primitives::{Line, Rectangle};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Control pin could not be driven
    Pin,
    /// Display not initialized
    NotInitialized,
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for rendering to a color display.
/// Pixels outside the display are clipped by the implementation.
pub trait DisplayBackend {
    /// Fill the entire display with one color
    fn fill_screen(&mut self, color: Rgb565) -> Result<(), DisplayError>;

    /// Set a single pixel
    fn draw_pixel(&mut self, point: Point, color: Rgb565) -> Result<(), DisplayError>;

    /// Fill a rectangle
    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw a one pixel wide line between two points, both ends included
    ///
    /// Pixels come from the `embedded-graphics` line rasterizer, so the same
    /// endpoints always touch the same pixels.
    fn draw_line(&mut self, start: Point, end: Point, color: Rgb565) -> Result<(), DisplayError> {
        for point in Line::new(start, end).points() {
            self.draw_pixel(point, color)?;
        }
        Ok(())
    }

    /// Flush buffered content to the display
    ///
    /// Displays that write straight to controller RAM have nothing to do.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Get pixel dimensions
    fn pixel_dimensions(&self) -> Size;

    /// Check if the display is ready
    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{Op, RecordingDisplay};

    fn pixels(display: &RecordingDisplay) -> std::vec::Vec<Point> {
        display
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Pixel(p, _) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_line_includes_both_endpoints() {
        let mut display = RecordingDisplay::new(320, 240);
        display
            .draw_line(Point::new(0, 0), Point::new(5, 2), Rgb565::new(31, 0, 0))
            .unwrap();
        let points = pixels(&display);
        assert_eq!(points.first(), Some(&Point::new(0, 0)));
        assert_eq!(points.last(), Some(&Point::new(5, 2)));
        assert_eq!(points.len(), 6);
    }

    #[test]
    fn test_line_matches_rasterizer() {
        let (start, end) = (Point::new(12, 40), Point::new(-3, 7));
        let mut display = RecordingDisplay::new(320, 240);
        display.draw_line(start, end, Rgb565::new(31, 0, 0)).unwrap();
        let expected: std::vec::Vec<Point> = Line::new(start, end).points().collect();
        assert_eq!(pixels(&display), expected);
    }

    #[test]
    fn test_line_single_point() {
        let mut display = RecordingDisplay::new(320, 240);
        display
            .draw_line(Point::new(7, 7), Point::new(7, 7), Rgb565::new(0, 63, 0))
            .unwrap();
        assert_eq!(pixels(&display), std::vec![Point::new(7, 7)]);
    }

    #[test]
    fn test_line_steep_and_reversed() {
        let mut display = RecordingDisplay::new(320, 240);
        display
            .draw_line(Point::new(3, 10), Point::new(1, 0), Rgb565::new(0, 0, 31))
            .unwrap();
        let points = pixels(&display);
        assert_eq!(points.len(), 11);
        // One pixel per row on a steep line
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.y, 10 - i as i32);
        }
    }
}
