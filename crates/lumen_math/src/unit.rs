use crate::{DQuat, Vec3};
use std::ops::{Deref, Mul, Neg};

/// A direction of length one.
///
/// The only way in is [`Unit::try_new`], which normalizes its input, so
/// every `Unit` in the program satisfies `|length - 1| < 1e-8`. Arithmetic
/// on the wrapped vector yields a plain [`Vec3`] that has to be normalized
/// again before it can be used as a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit(Vec3);

impl Unit {
    pub const X: Unit = Unit(Vec3::X);
    pub const Y: Unit = Unit(Vec3::Y);
    pub const Z: Unit = Unit(Vec3::Z);
    pub const NEG_Z: Unit = Unit(Vec3::NEG_Z);

    /// Normalize `v`.
    ///
    /// Returns `None` for zero-length or non-finite vectors instead of
    /// producing NaN components.
    #[inline]
    pub fn try_new(v: Vec3) -> Option<Self> {
        let len = v.length();
        if len.is_finite() && len > 1e-12 {
            Some(Self(v / len))
        } else {
            None
        }
    }

    /// The wrapped vector.
    #[inline]
    pub fn get(self) -> Vec3 {
        self.0
    }

    /// Mirror this direction about the normal `n`.
    #[inline]
    pub fn reflect(self, n: Unit) -> Unit {
        let r = self.0 - 2.0 * self.0.dot(n.0) * n.0;
        // Reflection is an isometry, the fallback is never taken for finite input.
        Unit::try_new(r).unwrap_or(-n)
    }

    /// Apply a rotation, re-normalizing to absorb rounding.
    #[inline]
    pub fn rotated(self, rotation: DQuat) -> Unit {
        Unit::try_new(rotation * self.0).unwrap_or(self)
    }
}

impl Deref for Unit {
    type Target = Vec3;

    #[inline]
    fn deref(&self) -> &Vec3 {
        &self.0
    }
}

impl From<Unit> for Vec3 {
    #[inline]
    fn from(u: Unit) -> Vec3 {
        u.0
    }
}

impl Neg for Unit {
    type Output = Unit;

    #[inline]
    fn neg(self) -> Unit {
        Unit(-self.0)
    }
}

impl Mul<f64> for Unit {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        self.0 * rhs
    }
}

impl Mul<Unit> for f64 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Unit) -> Vec3 {
        self * rhs.0
    }
}

/// Refract `incident` through a surface with normal `n` (facing the
/// incident side) using Snell's law with `ratio = eta_in / eta_out`.
///
/// Returns `None` on total internal reflection.
pub fn refract(incident: Unit, n: Unit, ratio: f64) -> Option<Unit> {
    let dt = incident.dot(n.0);
    let discriminant = 1.0 - ratio * ratio * (1.0 - dt * dt);
    if discriminant <= 0.0 {
        return None;
    }
    let refracted = ratio * (incident.0 - n.0 * dt) - n.0 * discriminant.sqrt();
    Unit::try_new(refracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_unit_length_is_one() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = Vec3::new(
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1e3..1e3),
            );
            let u = Unit::try_new(v).unwrap();
            assert!((u.length() - 1.0).abs() < 1e-8, "length {}", u.length());
        }
    }

    #[test]
    fn test_unit_rejects_degenerate() {
        assert!(Unit::try_new(Vec3::ZERO).is_none());
        assert!(Unit::try_new(Vec3::new(f64::NAN, 0.0, 1.0)).is_none());
        assert!(Unit::try_new(Vec3::new(f64::INFINITY, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_reflect() {
        let d = Unit::try_new(Vec3::new(1.0, -1.0, 0.0)).unwrap();
        let r = d.reflect(Unit::Y);
        assert!((r.get() - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn test_refract_straight_through() {
        let r = refract(Unit::NEG_Z, Unit::Z, 1.0 / 1.5).unwrap();
        assert!((r.get() - Vec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Grazing ray leaving glass into air.
        let d = Unit::try_new(Vec3::new(1.0, -0.1, 0.0)).unwrap();
        assert!(refract(d, Unit::Y, 1.5).is_none());
    }

    #[test]
    fn test_rotated_stays_unit() {
        let q = DQuat::from_rotation_y(0.3);
        let u = Unit::try_new(Vec3::new(0.3, 0.4, 0.5)).unwrap().rotated(q);
        assert!((u.length() - 1.0).abs() < 1e-8);
    }
}
