//! Material trait for surface scattering.

use std::sync::Arc;

use crate::{
    hittable::HitRecord,
    texture::{SolidColor, Texture},
};
use lumen_math::{random, refract, Color, Ray, Unit};
use rand::RngCore;

/// Outcome of a ray scattering off a surface.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel fraction of the scattered ray's color that survives
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed. Scattered rays start at the
    /// hit point and keep the incoming ray's time.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult>;

    /// Light emitted at the hit. Most materials return black.
    fn emitted(&self, _rec: &HitRecord) -> Color {
        Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Arc<M> {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        (**self).scatter(ray_in, rec, rng)
    }

    fn emitted(&self, rec: &HitRecord) -> Color {
        (**self).emitted(rec)
    }
}

#[inline]
fn texture_at(texture: &dyn Texture, rec: &HitRecord) -> Color {
    let (u, v) = rec.uv();
    texture.value(u, v, rec.p())
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with a solid albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::textured(SolidColor(albedo))
    }

    pub fn textured(albedo: impl Texture + 'static) -> Self {
        Self {
            albedo: Arc::new(albedo),
        }
    }
}

impl Material for Lambertian {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let normal = rec.normal();
        // Catch degenerate scatter direction
        let direction =
            Unit::try_new(normal.get() + random::random_in_unit_sphere(rng)).unwrap_or(normal);

        Some(ScatterResult {
            attenuation: texture_at(self.albedo.as_ref(), rec),
            scattered: Ray::new(rec.p(), direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        if !(0.0..=1.0).contains(&fuzz) {
            log::warn!("Metal fuzz {fuzz} outside [0, 1], clamping");
        }
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = ray_in.direction().reflect(rec.normal());
        let direction = reflected.get() + self.fuzz * random::random_in_unit_sphere(rng);

        // Only scatter if the reflected ray leaves the surface
        if direction.dot(*rec.normal()) <= 0.0 {
            return None;
        }
        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p(), Unit::try_new(direction)?, ray_in.time()),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, ratio: f64) -> f64 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let ratio = if rec.front_face() { 1.0 / self.ior } else { self.ior };
        let direction = ray_in.direction();
        let normal = rec.normal();
        let cos_theta = (-direction.get()).dot(*normal).min(1.0);

        // Total internal reflection when refraction has no solution
        let out = match refract(direction, normal, ratio) {
            Some(refracted) if Self::reflectance(cos_theta, ratio) <= random::gen_f64(rng) => refracted,
            _ => direction.reflect(normal),
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p(), out, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
#[derive(Clone)]
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::textured(SolidColor(emit))
    }

    pub fn textured(emit: impl Texture + 'static) -> Self {
        Self {
            emit: Arc::new(emit),
        }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, rec: &HitRecord) -> Color {
        texture_at(self.emit.as_ref(), rec)
    }
}

/// Phase function of a participating medium: scatters uniformly.
#[derive(Clone)]
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self::textured(SolidColor(albedo))
    }

    pub fn textured(albedo: impl Texture + 'static) -> Self {
        Self {
            albedo: Arc::new(albedo),
        }
    }
}

impl Material for Isotropic {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: texture_at(self.albedo.as_ref(), rec),
            scattered: Ray::new(rec.p(), random::random_unit(rng), ray_in.time()),
        })
    }
}
