//! Perlin gradient noise.

use lumen_math::{random, Unit, Vec3};
use rand::{Rng, RngCore};

const POINT_COUNT: usize = 256;

/// Octaves summed by [`Perlin::turbulence`] when no depth is given.
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Gradient noise over a 256-cell lattice with random unit gradients.
#[derive(Clone)]
pub struct Perlin {
    gradients: Vec<Unit>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    /// Draw the gradient table and permutations from `rng`.
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT).map(|_| random::random_unit(rng)).collect();
        Self {
            gradients,
            perm_x: permutation(rng),
            perm_y: permutation(rng),
            perm_z: permutation(rng),
        }
    }

    /// Noise value in `[-1, 1]`; zero at every lattice point.
    pub fn noise(&self, p: Vec3) -> f64 {
        let floor = p.floor();
        let (u, v, w) = (p.x - floor.x, p.y - floor.y, p.z - floor.z);
        let (i, j, k) = (floor.x as i64, floor.y as i64, floor.z as i64);

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[wrap(i + di as i64)]
                        ^ self.perm_y[wrap(j + dj as i64)]
                        ^ self.perm_z[wrap(k + dk as i64)];
                    *corner = self.gradients[idx].get();
                }
            }
        }

        trilinear(&c, u, v, w)
    }

    /// Sum of `depth` octaves, each at double frequency and half weight.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp);
            weight *= 0.5;
            temp *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn wrap(i: i64) -> usize {
    (i & (POINT_COUNT as i64 - 1)) as usize
}

/// Fisher-Yates shuffle of `0..POINT_COUNT`.
fn permutation(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    for i in (1..POINT_COUNT).rev() {
        let target = rng.gen_range(0..=i);
        perm.swap(i, target);
    }
    perm
}

/// Blend the corner gradients with Hermite-smoothed weights.
fn trilinear(c: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                let weight = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_permutations_are_permutations() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut perm = permutation(&mut rng);
        perm.sort_unstable();
        assert_eq!(perm, (0..POINT_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_noise_zero_on_lattice() {
        let mut rng = StdRng::seed_from_u64(12);
        let perlin = Perlin::new(&mut rng);
        for p in [Vec3::ZERO, Vec3::new(3.0, -7.0, 12.0), Vec3::splat(300.0)] {
            assert!(perlin.noise(p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_bounded_and_varied() {
        let mut rng = StdRng::seed_from_u64(13);
        let perlin = Perlin::new(&mut rng);

        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for _ in 0..2000 {
            let p = Vec3::new(
                random::gen_range(&mut rng, -50.0, 50.0),
                random::gen_range(&mut rng, -50.0, 50.0),
                random::gen_range(&mut rng, -50.0, 50.0),
            );
            let n = perlin.noise(p);
            assert!((-1.0..=1.0).contains(&n), "noise {n} out of range");
            min = min.min(n);
            max = max.max(n);
        }
        assert!(min < -0.1 && max > 0.1);
    }

    #[test]
    fn test_noise_is_deterministic_per_seed() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(14));
        let b = Perlin::new(&mut StdRng::seed_from_u64(14));
        let p = Vec3::new(0.3, 1.7, -2.2);
        assert_eq!(a.noise(p), b.noise(p));
    }

    #[test]
    fn test_turbulence_non_negative() {
        let mut rng = StdRng::seed_from_u64(15);
        let perlin = Perlin::new(&mut rng);
        for i in 0..100 {
            let p = Vec3::new(i as f64 * 0.37, i as f64 * -0.11, 1.3);
            assert!(perlin.turbulence(p, DEFAULT_TURBULENCE_DEPTH) >= 0.0);
        }
        assert_eq!(perlin.turbulence(Vec3::new(0.5, 0.5, 0.5), 0), 0.0);
    }
}
