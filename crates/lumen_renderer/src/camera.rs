//! Thin-lens camera for ray generation.

use lumen_core::{CameraSettings, SceneError};
use lumen_math::{random, Interval, Ray, Unit, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Immutable once built; shared by every render worker.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Unit,
    v: Unit,
    w: Unit,
    lens_radius: f64,
    shutter: Interval,
}

impl Camera {
    /// Build a camera.
    ///
    /// - `vfov`: vertical field of view in degrees, in (0, 180)
    /// - `aspect`: width over height
    /// - `aperture`: lens diameter, 0 for a pinhole
    /// - `focus_dist`: distance to the plane of perfect focus
    pub fn new(
        look_from: Vec3,
        look_at: Vec3,
        vup: Vec3,
        vfov: f64,
        aspect: f64,
        aperture: f64,
        focus_dist: f64,
    ) -> Result<Self, SceneError> {
        let invalid = |msg: String| Err(SceneError::InvalidCamera(msg));

        if !(vfov > 0.0 && vfov < 180.0) {
            return invalid(format!("vertical field of view {vfov} outside (0, 180)"));
        }
        if !(aspect > 0.0 && aspect.is_finite()) {
            return invalid(format!("aspect ratio {aspect} must be positive"));
        }
        if !(focus_dist > 0.0 && focus_dist.is_finite()) {
            return invalid(format!("focus distance {focus_dist} must be positive"));
        }
        if !(aperture >= 0.0 && aperture.is_finite()) {
            return invalid(format!("aperture {aperture} must be non-negative"));
        }

        let Some(w) = Unit::try_new(look_from - look_at) else {
            return invalid("look_from and look_at coincide".to_string());
        };
        let Some(u) = Unit::try_new(vup.cross(*w)) else {
            return invalid("vup is parallel to the view direction".to_string());
        };
        let Some(v) = Unit::try_new(w.cross(*u)) else {
            return invalid("degenerate camera basis".to_string());
        };

        let half_height = (vfov.to_radians() / 2.0).tan();
        let half_width = aspect * half_height;

        let lower_left = look_from
            - half_width * focus_dist * u
            - half_height * focus_dist * v
            - focus_dist * w;

        Ok(Self {
            origin: look_from,
            lower_left,
            horizontal: 2.0 * half_width * focus_dist * u,
            vertical: 2.0 * half_height * focus_dist * v,
            u,
            v,
            w,
            lens_radius: aperture / 2.0,
            shutter: Interval::new(0.0, 1.0),
        })
    }

    /// Build a camera from settings for an image of the given aspect ratio.
    pub fn from_settings(settings: &CameraSettings, aspect: f64) -> Result<Self, SceneError> {
        Self::new(
            settings.look_from,
            settings.look_at,
            settings.vup,
            settings.vfov,
            aspect,
            settings.aperture,
            settings.focus_dist,
        )
    }

    /// Restrict ray times to `[open, close]`.
    pub fn with_shutter(mut self, open: f64, close: f64) -> Self {
        self.shutter = Interval::new(open.min(close), open.max(close));
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Viewing direction (from the eye toward the scene).
    pub fn forward(&self) -> Unit {
        -self.w
    }

    /// Ray through viewport coordinates `(s, t)`, both in `[0, 1]` from
    /// the lower-left corner.
    pub fn ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random::random_in_unit_disk(rng);
        let offset = rd.x * self.u + rd.y * self.v;
        let source = self.origin + offset;
        let target = self.lower_left + s * self.horizontal + t * self.vertical;
        let direction = Unit::try_new(target - source).unwrap_or(-self.w);
        let time = random::gen_range(rng, self.shutter.min, self.shutter.max);

        Ray::new(source, direction, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole() -> Camera {
        Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0, 2.0, 0.0, 1.0).unwrap()
    }

    #[test]
    fn test_center_ray_points_forward() {
        let mut rng = StdRng::seed_from_u64(0);
        let ray = pinhole().ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction().get() - Vec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_corner_rays() {
        let mut rng = StdRng::seed_from_u64(0);
        let camera = pinhole();

        // 90 degree vfov, aspect 2: lower-left corner at (-2, -1, -1)
        let ray = camera.ray(0.0, 0.0, &mut rng);
        let expected = Vec3::new(-2.0, -1.0, -1.0).normalize();
        assert!((ray.direction().get() - expected).length() < 1e-12);

        let ray = camera.ray(1.0, 1.0, &mut rng);
        let expected = Vec3::new(2.0, 1.0, -1.0).normalize();
        assert!((ray.direction().get() - expected).length() < 1e-12);
    }

    #[test]
    fn test_ray_times_within_shutter() {
        let mut rng = StdRng::seed_from_u64(1);
        let camera = pinhole();
        for _ in 0..100 {
            let t = camera.ray(0.3, 0.6, &mut rng).time();
            assert!((0.0..1.0).contains(&t));
        }

        let camera = pinhole().with_shutter(0.5, 0.5);
        assert_eq!(camera.ray(0.3, 0.6, &mut rng).time(), 0.5);
    }

    #[test]
    fn test_lens_offsets_origin_within_aperture() {
        let camera =
            Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y, 40.0, 1.0, 0.5, 5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..100 {
            let ray = camera.ray(0.5, 0.5, &mut rng);
            let offset = ray.origin() - camera.origin();
            assert!(offset.length() < 0.25 + 1e-12);
            assert!(offset.z.abs() < 1e-12);
            // Everything through the center converges on the focus plane
            let at_focus = ray.at(5.0 / -ray.direction().z);
            assert!(at_focus.truncate().length() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_cameras() {
        let bad = [
            Camera::new(Vec3::ZERO, Vec3::ZERO, Vec3::Y, 90.0, 1.0, 0.0, 1.0),
            Camera::new(Vec3::ZERO, Vec3::Y, Vec3::Y, 90.0, 1.0, 0.0, 1.0),
            Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 0.0, 1.0, 0.0, 1.0),
            Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 180.0, 1.0, 0.0, 1.0),
            Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0, 0.0, 0.0, 1.0),
            Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0, 1.0, -1.0, 1.0),
            Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0, 1.0, 0.0, 0.0),
        ];
        for result in bad {
            assert!(matches!(result, Err(SceneError::InvalidCamera(_))));
        }
    }

    #[test]
    fn test_from_settings() {
        let settings = CameraSettings::default();
        let camera = Camera::from_settings(&settings, 2.0).unwrap();
        assert_eq!(camera.origin(), settings.look_from);
        assert!((camera.forward().get() - Vec3::NEG_Z).length() < 1e-12);
    }
}
