//! Constant-density participating media.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use lumen_core::SceneError;
use lumen_math::{random, Aabb, Interval, Ray, Unit};
use rand::RngCore;

/// Offset between the entry and exit searches through the boundary.
const EXIT_BIAS: f64 = 0.001;

/// A volume of constant density filling a closed boundary.
///
/// Rays passing through may scatter at an exponentially distributed
/// distance; the hit then uses the phase material and an arbitrary normal.
pub struct Volume<M: Material> {
    boundary: Box<dyn Hittable>,
    neg_inv_density: f64,
    phase: M,
}

impl<M: Material> Volume<M> {
    pub fn new(boundary: impl Hittable + 'static, density: f64, phase: M) -> Result<Self, SceneError> {
        if !(density > 0.0 && density.is_finite()) {
            return Err(SceneError::InvalidDensity(density));
        }
        Ok(Self {
            boundary: Box::new(boundary),
            neg_inv_density: -1.0 / density,
            phase,
        })
    }
}

impl<M: Material + 'static> Hittable for Volume<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?.t();
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry + EXIT_BIAS, f64::INFINITY), rng)?
            .t();

        let entry = entry.max(ray_t.min);
        let exit = exit.min(ray_t.max);
        if entry >= exit {
            return None;
        }
        let entry = entry.max(0.0);

        // Directions are unit length, so t is also distance
        let inside = exit - entry;
        let distance = self.neg_inv_density * (1.0 - random::gen_f64(rng)).ln();
        if distance >= inside {
            return None;
        }

        let t = entry + distance;
        Some(HitRecord::new(ray, t, Unit::X, (0.0, 0.0), &self.phase))
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.boundary.bounding_box(time)
    }
}
