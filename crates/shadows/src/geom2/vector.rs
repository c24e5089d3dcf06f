//! Point/vector helpers on top of `nalgebra::Vector2<f64>`.
//!
//! nalgebra already covers `+ - * /`, `norm` and `dot`; this trait adds the
//! handful of planar operations the search needs.

use nalgebra::Vector2;

/// 1 − 1/√2, the octagon correction used by `fast_unit_vector`.
const OCTAGON_K: f64 = 0.29289;

pub trait Vec2Ext: Sized {
    /// z-component of the 3D cross product (signed parallelogram area).
    fn cross_z(&self, other: &Self) -> f64;

    /// `|x| + |y|`.
    fn manhattan(&self) -> f64;

    /// Rotate `self` by the angle of `v` measured from +x (complex multiplication
    /// with `v / |v|`). `None` if `v` is the zero vector.
    fn rotate_by_complex(&self, v: &Self) -> Option<Self>;

    /// Quarter turn counter-clockwise (in y-up axes).
    fn rotate90(&self) -> Self;

    /// Approximate unit vector: the unit circle is replaced by an inscribed
    /// octagon, so the length lands in roughly [0.95, 1.0]. `None` for zero.
    fn fast_unit_vector(&self) -> Option<Self>;

    /// Component-wise floor.
    fn floor(&self) -> Self;

    fn distance_to(&self, other: &Self) -> f64;
}

impl Vec2Ext for Vector2<f64> {
    #[inline]
    fn cross_z(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn manhattan(&self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    fn rotate_by_complex(&self, v: &Self) -> Option<Self> {
        let n = v.norm();
        if !(n.is_finite()) || n == 0.0 {
            return None;
        }
        let u = v / n;
        Some(Vector2::new(
            self.x * u.x - self.y * u.y,
            self.x * u.y + self.y * u.x,
        ))
    }

    #[inline]
    fn rotate90(&self) -> Self {
        Vector2::new(-self.y, self.x)
    }

    fn fast_unit_vector(&self) -> Option<Self> {
        let ax = self.x.abs();
        let ay = self.y.abs();
        let m = ax.max(ay);
        if m == 0.0 {
            return None;
        }
        let mut ratio = 1.0 / m;
        ratio *= (1.0 + OCTAGON_K) - (ax + ay) * ratio * OCTAGON_K;
        Some(self * ratio)
    }

    #[inline]
    fn floor(&self) -> Self {
        self.map(f64::floor)
    }

    #[inline]
    fn distance_to(&self, other: &Self) -> f64 {
        (other - self).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn rotate_by_quarter_turn() {
        let v = vector![3.0, 1.0];
        let r = v.rotate_by_complex(&vector![0.0, 5.0]).unwrap();
        assert!((r - vector![-1.0, 3.0]).norm() < 1e-12);
        assert!((r - v.rotate90()).norm() < 1e-12);
        assert!(r.dot(&v).abs() < 1e-12);
    }

    #[test]
    fn rotate_by_zero_has_no_direction() {
        assert!(vector![1.0, 2.0].rotate_by_complex(&vector![0.0, 0.0]).is_none());
        assert!(vector![0.0, 0.0].fast_unit_vector().is_none());
    }

    #[test]
    fn fast_unit_vector_axes_and_diagonal() {
        let u = vector![-4.0, 0.0].fast_unit_vector().unwrap();
        assert!((u - vector![-1.0, 0.0]).norm() < 1e-9);
        let d = vector![2.0, 2.0].fast_unit_vector().unwrap();
        // octagon vertex on the diagonal sits at 1/√2 per axis
        assert!((d.x - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-4);
        assert!((d.x - d.y).abs() < 1e-12);
    }

    #[test]
    fn fast_unit_vector_randomized_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = vector![rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)];
            if v.norm() < 1e-6 {
                continue;
            }
            let u = v.fast_unit_vector().unwrap();
            let len = u.norm();
            assert!(len > 0.9 && len < 1.0 + 1e-4, "len {len} for {v:?}");
            // direction preserved
            assert!(u.cross_z(&v).abs() < 1e-9 * v.norm());
            assert!(u.dot(&v) > 0.0);
        }
    }

    #[test]
    fn cross_manhattan_floor() {
        let a = vector![1.0, 0.0];
        let b = vector![0.0, 2.5];
        assert!((a.cross_z(&b) - 2.5).abs() < 1e-12);
        assert!((b.cross_z(&a) + 2.5).abs() < 1e-12);
        assert_eq!(vector![-1.5, 2.0].manhattan(), 3.5);
        assert_eq!(vector![3.7, -0.2].floor(), vector![3.0, -1.0]);
        assert!((vector![0.0, 0.0].distance_to(&vector![3.0, 4.0]) - 5.0).abs() < 1e-12);
    }
}
