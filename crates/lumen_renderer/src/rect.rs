//! Axis-aligned rectangles and boxes built from them.

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    transform::Flip,
    Material,
};
use lumen_core::SceneError;
use lumen_math::{Aabb, Interval, Ray, Unit, Vec3};
use rand::RngCore;

/// Padding applied to a rectangle's box along its flat axis.
const RECT_PAD: f64 = 0.001;

const AXIS_NORMALS: [Unit; 3] = [Unit::X, Unit::Y, Unit::Z];

/// An axis-aligned rectangle.
///
/// Lies in the plane where one coordinate is constant; its outward normal
/// points along the positive direction of that axis.
pub struct Rectangle<M: Material> {
    min: Vec3,
    max: Vec3,
    axis: usize,
    material: M,
}

impl<M: Material> Rectangle<M> {
    /// Build a rectangle from two opposite corners.
    ///
    /// Exactly one coordinate must be equal between the corners.
    pub fn new(a: Vec3, b: Vec3, material: M) -> Result<Self, SceneError> {
        let (min, max) = (a.min(b), a.max(b));
        let mut flat = (0..3).filter(|&i| min[i] == max[i]);

        match (flat.next(), flat.next()) {
            (Some(axis), None) if (min - max).is_finite() => Ok(Self {
                min,
                max,
                axis,
                material,
            }),
            _ => Err(SceneError::DegenerateRectangle { min, max }),
        }
    }

    /// Index of the constant axis (0 = x, 1 = y, 2 = z).
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// The two in-plane axes, in cyclic order after the flat one.
    #[inline]
    fn plane_axes(&self) -> (usize, usize) {
        ((self.axis + 1) % 3, (self.axis + 2) % 3)
    }
}

impl<M: Material + 'static> Hittable for Rectangle<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        let k = self.axis;
        let t = (self.min[k] - ray.origin()[k]) / ray.direction()[k];
        if !ray_t.surrounds(t) {
            return None;
        }

        let (a, b) = self.plane_axes();
        let e1 = ray.origin()[a] + t * ray.direction()[a];
        let e2 = ray.origin()[b] + t * ray.direction()[b];
        if e1 < self.min[a] || e1 > self.max[a] || e2 < self.min[b] || e2 > self.max[b] {
            return None;
        }

        let u = (e1 - self.min[a]) / (self.max[a] - self.min[a]);
        let v = (e2 - self.min[b]) / (self.max[b] - self.min[b]);
        Some(HitRecord::new(ray, t, AXIS_NORMALS[k], (u, v), &self.material))
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        let mut pad = Vec3::ZERO;
        pad[self.axis] = RECT_PAD;
        Aabb::from_points(self.min - pad, self.max + pad)
    }
}

/// An axis-aligned box made of six rectangles.
pub struct Block {
    min: Vec3,
    max: Vec3,
    sides: HittableList,
}

impl Block {
    /// Build a box between two opposite corners.
    ///
    /// Faces on the minimum side are flipped so every outward normal points
    /// away from the interior.
    pub fn new<M>(a: Vec3, b: Vec3, material: M) -> Result<Self, SceneError>
    where
        M: Material + Clone + 'static,
    {
        let (min, max) = (a.min(b), a.max(b));
        let mut sides = HittableList::new();

        for axis in 0..3 {
            let mut low = max;
            low[axis] = min[axis];
            let mut high = min;
            high[axis] = max[axis];

            sides.add(Rectangle::new(high, max, material.clone())?);
            sides.add(Flip::new(Rectangle::new(min, low, material.clone())?));
        }

        Ok(Self { min, max, sides })
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }
}

impl Hittable for Block {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'_>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        Aabb::from_points(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use lumen_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    const T_RANGE: Interval = Interval::new(0.001, f64::INFINITY);

    fn white() -> Lambertian {
        Lambertian::new(Color::ONE)
    }

    #[test]
    fn test_rectangle_axis_detection() {
        let xy = Rectangle::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(2.0, 3.0, 1.0), white()).unwrap();
        assert_eq!(xy.axis(), 2);
        let xz = Rectangle::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(2.0, 5.0, 3.0), white()).unwrap();
        assert_eq!(xz.axis(), 1);
        let yz = Rectangle::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 3.0), white()).unwrap();
        assert_eq!(yz.axis(), 0);
    }

    #[test]
    fn test_degenerate_rectangles_rejected() {
        // No flat axis
        let err = Rectangle::new(Vec3::ZERO, Vec3::ONE, white());
        assert!(matches!(err, Err(SceneError::DegenerateRectangle { .. })));

        // Two flat axes (a line)
        let err = Rectangle::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), white());
        assert!(matches!(err, Err(SceneError::DegenerateRectangle { .. })));
    }

    #[test]
    fn test_rectangle_hit_and_uv() {
        let rect =
            Rectangle::new(Vec3::new(-1.0, -1.0, -2.0), Vec3::new(1.0, 1.0, -2.0), white()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.5, -0.5, 0.0), Unit::NEG_Z, 0.0);
        let rec = rect.hit(&ray, T_RANGE, &mut rng).unwrap();
        assert!((rec.t() - 2.0).abs() < 1e-12);
        assert!(rec.front_face());
        assert_eq!(rec.normal(), Unit::Z);

        // (u, v) follow (x, y) for a rectangle of constant z
        let (u, v) = rec.uv();
        assert!((u - 0.75).abs() < 1e-12);
        assert!((v - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rectangle_edges_inclusive() {
        let rect =
            Rectangle::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), white()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let edge = Ray::new(Vec3::new(1.0, 1.0, 1.0), Unit::NEG_Z, 0.0);
        assert!(rect.hit(&edge, T_RANGE, &mut rng).is_some());

        let outside = Ray::new(Vec3::new(1.0001, 0.5, 1.0), Unit::NEG_Z, 0.0);
        assert!(rect.hit(&outside, T_RANGE, &mut rng).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let rect =
            Rectangle::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), white()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::new(0.5, 0.5, 1.0), Unit::X, 0.0);
        assert!(rect.hit(&ray, T_RANGE, &mut rng).is_none());
    }

    #[test]
    fn test_rectangle_box_padded() {
        let rect =
            Rectangle::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 1.0), white()).unwrap();
        let bbox = rect.bounding_box(Interval::new(0.0, 1.0));
        assert!((bbox.y.size() - 2.0 * RECT_PAD).abs() < 1e-12);
        assert!(bbox.y.contains(2.0));
    }

    #[test]
    fn test_block_normals_point_outward() {
        let mat: Arc<dyn Material> = Arc::new(white());
        let block = Block::new(Vec3::splat(-1.0), Vec3::splat(1.0), mat).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let dirs = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        for dir in dirs {
            // From outside, aimed at the center: hits the face whose outward normal is `dir`
            let ray = Ray::new(dir * 5.0, Unit::try_new(-dir).unwrap(), 0.0);
            let rec = block.hit(&ray, T_RANGE, &mut rng).unwrap();
            assert!((rec.t() - 4.0).abs() < 1e-12);
            assert!(rec.front_face(), "face {dir} should be hit from outside");
            assert!((rec.outward_normal().get() - dir).length() < 1e-12);

            // From the inside: the same face, now a back-face hit
            let ray = Ray::new(Vec3::ZERO, Unit::try_new(dir).unwrap(), 0.0);
            let rec = block.hit(&ray, T_RANGE, &mut rng).unwrap();
            assert!(!rec.front_face(), "face {dir} should be hit from inside");
            assert!((rec.outward_normal().get() - dir).length() < 1e-12);
        }
    }
}
