//! Sphere primitives for ray tracing.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use lumen_core::SceneError;
use lumen_math::{Aabb, Interval, Ray, Unit, Vec3};
use rand::RngCore;

/// A sphere primitive.
pub struct Sphere<M: Material> {
    center: Vec3,
    radius: f64,
    material: M,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f64, material: M) -> Self {
        if radius < 0.0 {
            log::warn!("Sphere radius {radius} is negative, clamping to 0");
        }
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// UV coordinates of a point on the unit sphere.
///
/// `u` runs around the Y axis, `v` from the south pole (0) to the north pole (1).
fn sphere_uv(n: Vec3) -> (f64, f64) {
    let phi = n.z.atan2(n.x);
    let theta = n.y.clamp(-1.0, 1.0).asin();
    let u = 1.0 - (phi + PI) / (2.0 * PI);
    let v = (theta + FRAC_PI_2) / PI;
    (u, v)
}

/// Shared quadratic for static and moving spheres.
fn hit_sphere<'a>(
    center: Vec3,
    radius: f64,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    // Tangent rays are misses
    let discriminant = h * h - a * c;
    if discriminant <= 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let outward = Unit::try_new((ray.at(root) - center) / radius)?;
    Some(HitRecord::new(ray, root, outward, sphere_uv(*outward), material))
}

impl<M: Material + 'static> Hittable for Sphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        hit_sphere(self.center, self.radius, &self.material, ray, ray_t)
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }
}

/// A sphere whose center moves linearly between two points over `[t0, t1]`.
pub struct MovingSphere<M: Material> {
    center0: Vec3,
    center1: Vec3,
    t0: f64,
    t1: f64,
    radius: f64,
    material: M,
}

impl<M: Material> MovingSphere<M> {
    /// Create a moving sphere. The time span must not be empty.
    pub fn new(
        (center0, t0): (Vec3, f64),
        (center1, t1): (Vec3, f64),
        radius: f64,
        material: M,
    ) -> Result<Self, SceneError> {
        if t0 == t1 || !(t1 - t0).is_finite() {
            return Err(SceneError::InvalidTimeSpan { t0, t1 });
        }
        Ok(Self {
            center0,
            center1,
            t0,
            t1,
            radius: radius.max(0.0),
            material,
        })
    }

    /// Center at the given time, extrapolated outside `[t0, t1]`.
    pub fn center(&self, time: f64) -> Vec3 {
        self.center0 + (time - self.t0) / (self.t1 - self.t0) * (self.center1 - self.center0)
    }

    fn box_at(&self, time: f64) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        let c = self.center(time);
        Aabb::from_points(c - rvec, c + rvec)
    }
}

impl<M: Material + 'static> Hittable for MovingSphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        hit_sphere(self.center(ray.time()), self.radius, &self.material, ray, ray_t)
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        Aabb::surrounding(&self.box_at(time.min), &self.box_at(time.max))
    }
}
