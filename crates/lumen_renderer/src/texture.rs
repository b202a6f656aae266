//! Textures: color as a function of surface coordinates and position.

use std::sync::Arc;

use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
use lumen_core::Raster;
use lumen_math::{Color, Vec3};
use rand::RngCore;

/// A color lookup at a surface point.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color;
}

impl<T: Texture + ?Sized> Texture for Arc<T> {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        (**self).value(u, v, p)
    }
}

/// A single constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor(pub Color);

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Vec3) -> Color {
        self.0
    }
}

/// 3D checkerboard alternating between two textures.
#[derive(Clone)]
pub struct Checker {
    scale: f64,
    odd: Arc<dyn Texture>,
    even: Arc<dyn Texture>,
}

impl Checker {
    pub fn new(scale: f64, odd: impl Texture + 'static, even: impl Texture + 'static) -> Self {
        Self {
            scale,
            odd: Arc::new(odd),
            even: Arc::new(even),
        }
    }

    /// Checkerboard of two solid colors.
    pub fn solid(scale: f64, odd: Color, even: Color) -> Self {
        Self::new(scale, SolidColor(odd), SolidColor(even))
    }
}

impl Texture for Checker {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        let s = self.scale;
        let sines = (s * p.x).sin() * (s * p.y).sin() * (s * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// How a [`NoiseTexture`] turns Perlin noise into a grey level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseStyle {
    /// Plain noise remapped to `[0, 1]`.
    #[default]
    Smooth,
    /// Multi-octave turbulence.
    Turbulence,
    /// Sine stripes along Z phase-shifted by turbulence.
    Marble,
}

/// Grey procedural noise.
#[derive(Clone)]
pub struct NoiseTexture {
    perlin: Perlin,
    scale: f64,
    style: NoiseStyle,
}

impl NoiseTexture {
    pub fn new(rng: &mut dyn RngCore, scale: f64, style: NoiseStyle) -> Self {
        Self {
            perlin: Perlin::new(rng),
            scale,
            style,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f64, _v: f64, p: Vec3) -> Color {
        let s = self.scale;
        let grey = match self.style {
            NoiseStyle::Smooth => 0.5 * (1.0 + self.perlin.noise(s * p)),
            NoiseStyle::Turbulence => self.perlin.turbulence(s * p, DEFAULT_TURBULENCE_DEPTH),
            NoiseStyle::Marble => {
                0.5 * (1.0 + (s * p.z + 10.0 * self.perlin.turbulence(p, DEFAULT_TURBULENCE_DEPTH)).sin())
            }
        };
        Color::splat(grey)
    }
}

/// Texture sampled from a decoded image, nearest-neighbour.
#[derive(Clone)]
pub struct ImageTexture {
    raster: Arc<Raster>,
}

impl ImageTexture {
    pub fn new(raster: Arc<Raster>) -> Self {
        log::debug!(
            "Image texture from {} ({}x{})",
            raster.source(),
            raster.width(),
            raster.height()
        );
        Self { raster }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Vec3) -> Color {
        let u = u.clamp(0.0, 1.0);
        // Image rows run top to bottom
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = (u * self.raster.width() as f64) as u32;
        let j = (v * self.raster.height() as f64) as u32;
        self.raster.pixel(i, j)
    }
}
