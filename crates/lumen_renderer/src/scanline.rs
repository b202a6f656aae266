//! Scanline work units for progressive rendering.
//!
//! A scanline owns the running sums of its pixels. During a pass it is
//! moved to exactly one worker, so accumulation needs no synchronization.

use crate::pixels::{pack_color, pack_gamma, PixelBuffer};
use lumen_math::Color;

/// Running color sum and sample count for one pixel.
#[derive(Debug, Clone, Copy)]
pub struct PixelAccumulator {
    /// Index into the output buffer (row-major, top row first)
    pub index: usize,
    /// Column, left to right
    pub x: u32,
    /// Row counted up from the bottom of the image
    pub y: u32,
    sum: Color,
    samples: u32,
}

impl PixelAccumulator {
    pub fn new(index: usize, x: u32, y: u32) -> Self {
        Self {
            index,
            x,
            y,
            sum: Color::ZERO,
            samples: 0,
        }
    }

    #[inline]
    pub fn add(&mut self, color: Color) {
        self.sum += color;
        self.samples += 1;
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Mean color, or `None` before the first sample.
    pub fn average(&self) -> Option<Color> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }
}

/// One row of pixel accumulators.
#[derive(Debug, Clone)]
pub struct Scanline {
    /// Row in the output buffer, 0 at the top
    pub row: u32,
    pub pixels: Vec<PixelAccumulator>,
}

impl Scanline {
    /// Show the current averages before refining them.
    ///
    /// Values are written without gamma correction and with unchanged
    /// sample counts.
    pub fn write_preview(&self, buffer: &PixelBuffer) {
        for pixel in &self.pixels {
            if let Some(avg) = pixel.average() {
                buffer.store(pixel.index, pack_color(avg), pixel.samples);
            }
        }
    }

    /// Publish the final, gamma-corrected averages.
    pub fn write_result(&self, buffer: &PixelBuffer) {
        for pixel in &self.pixels {
            if let Some(avg) = pixel.average() {
                buffer.store(pixel.index, pack_gamma(avg), pixel.samples);
            }
        }
    }
}

/// Split an image into scanlines, top row first.
pub fn generate_scanlines(width: u32, height: u32) -> Vec<Scanline> {
    (0..height)
        .map(|row| {
            let y = height - 1 - row;
            let pixels = (0..width)
                .map(|x| PixelAccumulator::new(row as usize * width as usize + x as usize, x, y))
                .collect();
            Scanline { row, pixels }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_scanlines_covers_image() {
        let lines = generate_scanlines(4, 3);
        assert_eq!(lines.len(), 3);

        let total: usize = lines.iter().map(|l| l.pixels.len()).sum();
        assert_eq!(total, 12);

        // Index 0 is the top-left pixel, which is row height-1 counted from the bottom
        let first = lines[0].pixels[0];
        assert_eq!((first.index, first.x, first.y), (0, 0, 2));
        let last = lines[2].pixels[3];
        assert_eq!((last.index, last.x, last.y), (11, 3, 0));
    }

    #[test]
    fn test_accumulator_average() {
        let mut acc = PixelAccumulator::new(0, 0, 0);
        assert!(acc.average().is_none());
        acc.add(Color::new(1.0, 0.0, 0.0));
        acc.add(Color::new(0.0, 0.0, 1.0));
        assert_eq!(acc.samples(), 2);
        assert_eq!(acc.average(), Some(Color::new(0.5, 0.0, 0.5)));
    }

    #[test]
    fn test_preview_then_result() {
        let buffer = PixelBuffer::new(1, 1);
        let mut line = generate_scanlines(1, 1).remove(0);

        // Nothing to preview yet
        line.write_preview(&buffer);
        assert_eq!(buffer.get(0, 0), 0);

        line.pixels[0].add(Color::splat(0.25));
        line.write_result(&buffer);
        assert_eq!(buffer.get(0, 0), 0x7F7F7F);
        assert_eq!(buffer.sample_count(0, 0), 1);

        line.write_preview(&buffer);
        assert_eq!(buffer.get(0, 0), 0x3F3F3F);
        assert_eq!(buffer.sample_count(0, 0), 1);
    }
}
