//! Shared output buffer and color packing.
//!
//! Workers write packed `0xRRGGBB` values and sample counts for disjoint
//! pixels while readers poll the buffer to display progress, so every slot
//! is an atomic and no lock is ever taken.

use std::sync::atomic::{AtomicU32, Ordering};

use lumen_math::Color;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize one channel: `min(255, c * 255.99)`, negatives and NaN to 0.
#[inline]
fn quantize(c: f64) -> u32 {
    // NaN survives `clamp` and the `as` cast maps it to 0
    (c * 255.99).clamp(0.0, 255.0) as u8 as u32
}

/// Pack a color as `0xRRGGBB` without any transfer curve.
#[inline]
pub fn pack_color(color: Color) -> u32 {
    (quantize(color.x) << 16) | (quantize(color.y) << 8) | quantize(color.z)
}

/// Pack a linear color after gamma correction.
#[inline]
pub fn pack_gamma(color: Color) -> u32 {
    pack_color(Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    ))
}

/// Split `0xRRGGBB` into bytes.
#[inline]
pub fn unpack_rgb(packed: u32) -> [u8; 3] {
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}

/// Row-major image of packed colors plus per-pixel sample counts.
///
/// Index 0 is the top-left pixel.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    packed: Vec<AtomicU32>,
    samples: Vec<AtomicU32>,
}

impl PixelBuffer {
    /// Create a black buffer with no samples.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            packed: (0..len).map(|_| AtomicU32::new(0)).collect(),
            samples: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.packed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Packed color at `(x, y)`, `y` counted from the top.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.packed[self.index(x, y)].load(Ordering::Relaxed)
    }

    /// Samples accumulated so far at `(x, y)`.
    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.samples[self.index(x, y)].load(Ordering::Relaxed)
    }

    /// Write one pixel. Only the worker owning the pixel's scanline calls this.
    pub(crate) fn store(&self, index: usize, packed: u32, samples: u32) {
        self.packed[index].store(packed, Ordering::Relaxed);
        self.samples[index].store(samples, Ordering::Relaxed);
    }

    /// Copy of all packed values in row-major order.
    pub fn snapshot(&self) -> Vec<u32> {
        self.packed.iter().map(|p| p.load(Ordering::Relaxed)).collect()
    }

    /// Row-major RGB bytes, e.g. for PNG encoding.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len() * 3);
        for packed in &self.packed {
            bytes.extend_from_slice(&unpack_rgb(packed.load(Ordering::Relaxed)));
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.25), 0.5);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert_eq!(linear_to_gamma(1.0), 1.0);
    }

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color(Color::ZERO), 0x000000);
        assert_eq!(pack_color(Color::ONE), 0xFFFFFF);
        assert_eq!(pack_color(Color::new(1.0, 0.0, 0.0)), 0xFF0000);
        assert_eq!(pack_color(Color::new(0.5, 0.5, 0.5)), 0x7F7F7F);
        // Out of range and NaN channels saturate
        assert_eq!(pack_color(Color::new(7.0, -3.0, f64::NAN)), 0xFF0000);
    }

    #[test]
    fn test_pack_gamma() {
        assert_eq!(pack_gamma(Color::splat(0.25)), 0x7F7F7F);
    }

    #[test]
    fn test_unpack_rgb() {
        assert_eq!(unpack_rgb(0x123456), [0x12, 0x34, 0x56]);
        assert_eq!(unpack_rgb(pack_color(Color::new(0.0, 1.0, 0.0))), [0, 255, 0]);
    }

    #[test]
    fn test_buffer_layout() {
        let buffer = PixelBuffer::new(3, 2);
        assert_eq!(buffer.len(), 6);

        // Bottom-right pixel is the last index
        buffer.store(5, 0xABCDEF, 4);
        assert_eq!(buffer.get(2, 1), 0xABCDEF);
        assert_eq!(buffer.sample_count(2, 1), 4);
        assert_eq!(buffer.sample_count(0, 0), 0);

        let bytes = buffer.to_rgb8();
        assert_eq!(bytes.len(), 18);
        assert_eq!(&bytes[15..], &[0xAB, 0xCD, 0xEF]);
        assert_eq!(buffer.snapshot()[5], 0xABCDEF);
    }
}
