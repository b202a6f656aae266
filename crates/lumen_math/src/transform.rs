// Rotation helpers for bounding boxes.
//
// glam::DQuat already rotates points and directions; boxes need the
// eight-corner treatment.

use crate::{Aabb, DQuat, Vec3};

/// Extension trait for rotations acting on bounding boxes.
pub trait RotationExt {
    /// Bounding box of the rotated box: every corner is rotated and the
    /// result is the union of the eight rotated points.
    fn rotate_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl RotationExt for DQuat {
    fn rotate_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = aabb.corners();
        let first = *self * corners[0];

        let (lo, hi) = corners[1..]
            .iter()
            .map(|&corner| *self * corner)
            .fold((first, first), |(lo, hi): (Vec3, Vec3), p| (lo.min(p), hi.max(p)));

        Aabb::from_points(lo, hi)
    }
}
