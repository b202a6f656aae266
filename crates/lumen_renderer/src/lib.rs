//! Lumen renderer - progressive CPU path tracing
//!
//! A Monte Carlo path tracer: geometry and its BVH, materials and
//! textures, a thin-lens camera, and a multi-threaded renderer that
//! refines the image over a sequence of sampling passes.

mod bvh;
mod camera;
mod hittable;
mod material;
mod perlin;
mod pixels;
mod rect;
mod renderer;
mod scanline;
mod sphere;
mod texture;
mod transform;
mod volume;

pub use bvh::Bvh;
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult};
pub use perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
pub use pixels::{linear_to_gamma, pack_color, pack_gamma, unpack_rgb, PixelBuffer};
pub use rect::{Block, Rectangle};
pub use renderer::{
    background_color, ray_color, render, sample_pixel, PassStats, RenderHandle, RenderReport,
    Renderer, Shading, T_MIN,
};
pub use scanline::{generate_scanlines, PixelAccumulator, Scanline};
pub use sphere::{MovingSphere, Sphere};
pub use texture::{Checker, ImageTexture, NoiseStyle, NoiseTexture, SolidColor, Texture};
pub use transform::{Flip, RotateY, Translate};
pub use volume::Volume;

/// Re-export math and settings types used throughout the public API
pub use lumen_core::{Background, CameraSettings, ConfigError, RenderSettings, SceneError};
pub use lumen_math::{Aabb, Color, Interval, Ray, Unit, Vec3};
