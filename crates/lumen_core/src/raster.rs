//! Decoded images for image textures.
//!
//! Rasters are decoded once while the scene is being built, so a missing or
//! corrupt file is reported before any pixel is rendered.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use lumen_math::Color;

use crate::error::{TextureError, TextureResult};

/// A decoded image with linear [0, 1] float channels.
#[derive(Clone, Debug)]
pub struct Raster {
    width: u32,
    height: u32,
    /// Row-major, top row first
    pixels: Vec<Color>,
    /// Where the pixels came from (for logging)
    source: String,
}

impl Raster {
    /// Create a raster from row-major pixel data.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Color>,
        source: impl Into<String>,
    ) -> TextureResult<Self> {
        let source = source.into();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(source));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                path: source,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            source,
        })
    }

    /// Decode an image file.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_image(&img, path.display().to_string())
    }

    /// Convert an already decoded image.
    ///
    /// Channels are widened to 16 bits before conversion so 8 and 16 bit
    /// sources share one path.
    pub fn from_image(img: &DynamicImage, source: impl Into<String>) -> TextureResult<Self> {
        let rgb = img.to_rgb16();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    channel_to_unit(p[0]),
                    channel_to_unit(p[1]),
                    channel_to_unit(p[2]),
                )
            })
            .collect();
        Self::new(width, height, pixels, source)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Pixel at column `x`, row `y` (row 0 is the top). Out of range
    /// coordinates are clamped to the border.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Approximate memory footprint.
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Color>()
    }
}

fn channel_to_unit(value: u16) -> f64 {
    value as f64 / u16::MAX as f64
}

/// Rasters shared by path, so a scene that textures several objects with
/// the same file decodes it once.
#[derive(Default)]
pub struct RasterCache {
    rasters: HashMap<String, Arc<Raster>>,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path`, or return the raster decoded earlier.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Raster>> {
        if let Some(raster) = self.rasters.get(path) {
            return Ok(raster.clone());
        }

        let raster = Arc::new(Raster::open(path)?);
        log::debug!(
            "Loaded raster: {} ({}x{}, {:.1} KB)",
            path,
            raster.width(),
            raster.height(),
            raster.size_bytes() as f64 / 1024.0
        );
        self.rasters.insert(path.to_string(), raster.clone());
        Ok(raster)
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient() -> DynamicImage {
        DynamicImage::ImageRgb16(ImageBuffer::from_fn(4, 2, |x, y| {
            Rgb([x as u16 * 0x4000, y as u16 * u16::MAX, 0])
        }))
    }

    #[test]
    fn test_from_image_scales_to_unit_range() {
        let raster = Raster::from_image(&gradient(), "gradient").unwrap();
        assert_eq!(raster.width(), 4);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.source(), "gradient");

        assert_eq!(raster.pixel(0, 0), Color::ZERO);
        let bottom_right = raster.pixel(3, 1);
        assert!((bottom_right.x - 0xC000 as f64 / 65535.0).abs() < 1e-12);
        assert_eq!(bottom_right.y, 1.0);
    }

    #[test]
    fn test_pixel_clamps() {
        let raster = Raster::from_image(&gradient(), "gradient").unwrap();
        assert_eq!(raster.pixel(100, 100), raster.pixel(3, 1));
    }

    #[test]
    fn test_eight_bit_source() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb([255u8, 0, 128])));
        let raster = Raster::from_image(&img, "rgb8").unwrap();
        let p = raster.pixel(0, 0);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert_eq!(p.y, 0.0);
        assert!((p.z - 128.0 / 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_new_validates_size() {
        assert!(matches!(
            Raster::new(0, 4, Vec::new(), "empty"),
            Err(TextureError::Empty(_))
        ));
        assert!(matches!(
            Raster::new(2, 2, vec![Color::ONE; 3], "short"),
            Err(TextureError::SizeMismatch { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Raster::open("/no/such/texture.png").unwrap_err();
        assert!(matches!(err, TextureError::Open { .. }));
    }

    #[test]
    fn test_cache_decodes_once() {
        let path = std::env::temp_dir().join(format!("lumen_raster_{}.png", std::process::id()));
        gradient().to_rgb8().save(&path).unwrap();
        let key = path.to_string_lossy().to_string();

        let mut cache = RasterCache::new();
        let a = cache.load(&key).unwrap();
        let b = cache.load(&key).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let _ = std::fs::remove_file(&path);
    }
}
