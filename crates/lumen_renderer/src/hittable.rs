//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::Material;
use lumen_math::{Aabb, DQuat, Interval, Ray, Unit, Vec3};
use rand::RngCore;

/// Record of a ray-object intersection.
///
/// Built only through [`HitRecord::new`], which enforces the front-face
/// convention: the stored normal always points against the incoming ray,
/// and `front_face` remembers whether the ray arrived from the outside.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    t: f64,
    p: Vec3,
    normal: Unit,
    u: f64,
    v: f64,
    front_face: bool,
    material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Record a hit at parameter `t` along `ray`.
    pub fn new(
        ray: &Ray,
        t: f64,
        outward_normal: Unit,
        (u, v): (f64, f64),
        material: &'a dyn Material,
    ) -> Self {
        // If the ray and normal point in the same direction, we're inside
        let front_face = ray.direction().dot(*outward_normal) < 0.0;
        Self {
            t,
            p: ray.at(t),
            normal: if front_face { outward_normal } else { -outward_normal },
            u,
            v,
            front_face,
            material,
        }
    }

    /// Parameter along the ray (also the distance, directions are unit).
    #[inline]
    pub fn t(&self) -> f64 {
        self.t
    }

    /// World-space hit point.
    #[inline]
    pub fn p(&self) -> Vec3 {
        self.p
    }

    /// Surface normal, facing the side the ray came from.
    #[inline]
    pub fn normal(&self) -> Unit {
        self.normal
    }

    /// Normal on the outward side of the surface.
    #[inline]
    pub fn outward_normal(&self) -> Unit {
        if self.front_face {
            self.normal
        } else {
            -self.normal
        }
    }

    #[inline]
    pub fn uv(&self) -> (f64, f64) {
        (self.u, self.v)
    }

    /// Whether the ray hit the outward face.
    #[inline]
    pub fn front_face(&self) -> bool {
        self.front_face
    }

    #[inline]
    pub fn material(&self) -> &'a dyn Material {
        self.material
    }

    /// Move the record out of a translated frame.
    pub(crate) fn translate(&mut self, offset: Vec3) {
        self.p += offset;
    }

    /// Move the record out of a rotated frame. Rotations preserve the
    /// angle to the ray, so the face orientation is unchanged.
    pub(crate) fn rotate(&mut self, rotation: DQuat) {
        self.p = rotation * self.p;
        self.normal = self.normal.rotated(rotation);
    }

    /// Swap which side of the surface counts as outside.
    pub(crate) fn flip_face(&mut self) {
        self.front_face = !self.front_face;
    }
}

/// Something a ray can hit.
pub trait Hittable: Send + Sync {
    /// Nearest hit with `t` strictly inside `ray_t`.
    ///
    /// `rng` is the random stream of the worker tracing `ray`; only
    /// probabilistic surfaces such as volumes draw from it.
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>>;

    /// Box enclosing the object over the given time span.
    fn bounding_box(&self, time: Interval) -> Aabb;
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        (**self).bounding_box(time)
    }
}

impl<H: Hittable + ?Sized> Hittable for Arc<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        (**self).bounding_box(time)
    }
}

/// A list of hittable objects, searched linearly.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Hand the objects over, e.g. to build a BVH.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t());
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, max), rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.objects
            .iter()
            .fold(Aabb::EMPTY, |acc, obj| Aabb::surrounding(&acc, &obj.bounding_box(time)))
    }
}
