use crate::{Unit, Vec3};

/// A ray in 3D space with origin, unit direction and time.
///
/// Rays are plain values: the camera creates one per pixel sample and
/// every scattering bounce creates a fresh one. `time` lies in the shutter
/// interval and drives motion blur.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Unit,
    pub time: f64,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Unit, time: f64) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction of the ray.
    #[inline]
    pub fn direction(&self) -> Unit {
        self.direction
    }

    /// Get the time value of the ray.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Since the direction has unit length, `t` is also the distance
    /// travelled from the origin.
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
