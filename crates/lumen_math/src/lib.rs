//! Lumen math - vectors, rays, intervals and bounding boxes.
//!
//! Thin layer over glam's double precision types plus the few value
//! types the path tracer needs on top of them.

pub use glam::{DQuat, DVec3};

mod aabb;
mod interval;
pub mod random;
mod ray;
mod transform;
mod unit;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::RotationExt;
pub use unit::{refract, Unit};

/// Three component vector used for points, offsets and colors.
pub type Vec3 = DVec3;

/// Linear RGB color, one channel per component.
pub type Color = DVec3;
