//! Instance wrappers: translation, rotation about Y, and face flipping.
//!
//! Each wrapper owns its child and maps rays into the child's frame before
//! delegating, then maps the resulting hit back into world space.

use crate::hittable::{HitRecord, Hittable};
use lumen_math::{Aabb, DQuat, Interval, Ray, RotationExt, Vec3};
use rand::RngCore;

/// Moves a child object by a fixed offset.
pub struct Translate {
    child: Box<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(child: impl Hittable + 'static, offset: Vec3) -> Self {
        Self {
            child: Box::new(child),
            offset,
        }
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let mut rec = self.child.hit(&moved, ray_t, rng)?;
        rec.translate(self.offset);
        Some(rec)
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.child.bounding_box(time).translate(self.offset)
    }
}

/// Rotates a child object about the Y axis.
pub struct RotateY {
    child: Box<dyn Hittable>,
    rotation: DQuat,
    inverse: DQuat,
    bbox: Aabb,
}

impl RotateY {
    /// Rotate `child` by `degrees` counter-clockwise when looking down -Y.
    pub fn new(child: impl Hittable + 'static, degrees: f64) -> Self {
        let rotation = DQuat::from_rotation_y(degrees.to_radians());
        let bbox = rotation.rotate_aabb(&child.bounding_box(Interval::new(0.0, 1.0)));
        Self {
            child: Box::new(child),
            rotation,
            inverse: rotation.inverse(),
            bbox,
        }
    }
}

impl Hittable for RotateY {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let local = Ray::new(
            self.inverse * ray.origin(),
            ray.direction().rotated(self.inverse),
            ray.time(),
        );
        let mut rec = self.child.hit(&local, ray_t, rng)?;
        rec.rotate(self.rotation);
        Some(rec)
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        self.bbox
    }
}

/// Swaps the inside and outside of a child surface.
pub struct Flip {
    child: Box<dyn Hittable>,
}

impl Flip {
    pub fn new(child: impl Hittable + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }
}

impl Hittable for Flip {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let mut rec = self.child.hit(ray, ray_t, rng)?;
        rec.flip_face();
        Some(rec)
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.child.bounding_box(time)
    }
}
