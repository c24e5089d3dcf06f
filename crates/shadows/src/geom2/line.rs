//! Infinite lines through two points.
//!
//! A `Line2` remembers the two points it was built from, so it doubles as a
//! segment for `point_in_segment`. Parallel lines are an ordinary outcome
//! here (`intersection` returns `None`); only `A == B` is an error.

use std::fmt;

use nalgebra::Vector2;

use super::types::{GeomCfg, GeomError};
use super::vector::Vec2Ext;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line2 {
    pub a: Vector2<f64>,
    pub b: Vector2<f64>,
    /// Direction `b - a`.
    pub vec: Vector2<f64>,
    /// `dy/dx`; 0 for vertical lines.
    pub slope: f64,
    /// y-intercept of `y = slope·x + lift`.
    pub lift: f64,
}

impl Line2 {
    pub fn new(a: Vector2<f64>, b: Vector2<f64>) -> Result<Self, GeomError> {
        let vec = b - a;
        if vec.manhattan() == 0.0 {
            return Err(GeomError::DegenerateLine { at: a });
        }
        let slope = if vec.x != 0.0 { vec.y / vec.x } else { 0.0 };
        Ok(Self {
            a,
            b,
            vec,
            slope,
            lift: -slope * a.x + a.y,
        })
    }

    /// Exact intersection via the cross-product ratio
    /// `t = (vec_other × (a - other.a)) / (vec × vec_other)`.
    ///
    /// Returns `None` for parallel (or coincident) lines.
    pub fn intersection(&self, other: &Line2) -> Option<Vector2<f64>> {
        let denom = self.vec.cross_z(&other.vec);
        if denom == 0.0 {
            return None;
        }
        let c = self.a - other.a;
        let t = other.vec.cross_z(&c) / denom;
        Some(self.a + self.vec * t)
    }

    #[inline]
    pub fn parallel(&self, other: &Line2) -> bool {
        self.vec.cross_z(&other.vec) == 0.0
    }

    /// Like `parallel`, but treats a relative cross product below `eps_parallel`
    /// as parallel too.
    pub fn parallel_eps(&self, other: &Line2, cfg: &GeomCfg) -> bool {
        let scale = self.vec.norm() * other.vec.norm();
        self.vec.cross_z(&other.vec).abs() <= cfg.eps_parallel * scale
    }

    /// `vec × (p - a)`: positive left of `a→b`, negative right, ~0 on the line.
    #[inline]
    pub fn signed_side(&self, p: Vector2<f64>) -> f64 {
        self.vec.cross_z(&(p - self.a))
    }

    /// True iff `p` lies on this line (perpendicular distance within
    /// `eps_collinear`) and its projection falls between `a` and `b` inclusive.
    pub fn point_in_segment(&self, p: Vector2<f64>, cfg: &GeomCfg) -> bool {
        if cfg.coincide(p, self.a) || cfg.coincide(p, self.b) {
            return true;
        }
        let len = self.vec.norm();
        let rel = p - self.a;
        if (self.vec.cross_z(&rel) / len).abs() > cfg.eps_collinear {
            return false;
        }
        let along = self.vec.dot(&rel) / len;
        along >= -cfg.eps_point && along <= len + cfg.eps_point
    }
}

impl fmt::Display for Line2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vec.x == 0.0 {
            write!(f, "[x = {:.3}]", self.a.x)
        } else {
            write!(f, "[y = {:.3}x + {:.3}]", self.slope, self.lift)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn degenerate_line_is_rejected() {
        let p = vector![2.0, 3.0];
        assert_eq!(
            Line2::new(p, p).unwrap_err(),
            GeomError::DegenerateLine { at: p }
        );
    }

    #[test]
    fn slope_and_lift() {
        let l = Line2::new(vector![1.0, 3.0], vector![3.0, 7.0]).unwrap();
        assert!((l.slope - 2.0).abs() < 1e-12);
        assert!((l.lift - 1.0).abs() < 1e-12);
        assert_eq!(l.to_string(), "[y = 2.000x + 1.000]");
        let v = Line2::new(vector![4.0, 0.0], vector![4.0, 1.0]).unwrap();
        assert_eq!(v.slope, 0.0);
        assert_eq!(v.to_string(), "[x = 4.000]");
    }

    #[test]
    fn intersection_of_crossing_lines() {
        let l1 = Line2::new(vector![0.0, 0.0], vector![4.0, 4.0]).unwrap();
        let l2 = Line2::new(vector![0.0, 4.0], vector![4.0, 0.0]).unwrap();
        let p = l1.intersection(&l2).unwrap();
        assert!((p - vector![2.0, 2.0]).norm() < 1e-12);
        // symmetric
        let q = l2.intersection(&l1).unwrap();
        assert!((p - q).norm() < 1e-12);
    }

    #[test]
    fn intersection_outside_both_segments_still_reported() {
        let l1 = Line2::new(vector![0.0, 0.0], vector![1.0, 0.0]).unwrap();
        let l2 = Line2::new(vector![5.0, 1.0], vector![5.0, 2.0]).unwrap();
        let p = l1.intersection(&l2).unwrap();
        assert!((p - vector![5.0, 0.0]).norm() < 1e-12);
        let cfg = GeomCfg::default();
        assert!(!l1.point_in_segment(p, &cfg));
        assert!(!l2.point_in_segment(p, &cfg));
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let l1 = Line2::new(vector![0.0, 0.0], vector![4.0, 0.0]).unwrap();
        let l2 = Line2::new(vector![0.0, 4.0], vector![-2.0, 4.0]).unwrap();
        assert!(l1.parallel(&l2));
        assert!(l1.intersection(&l2).is_none());
        assert!(l1.parallel_eps(&l2, &GeomCfg::default()));
        let l3 = Line2::new(vector![7.0, 0.0], vector![9.0, 1e-15]).unwrap();
        assert!(!l1.parallel(&l3));
        assert!(l1.parallel_eps(&l3, &GeomCfg::default()));
    }

    #[test]
    fn segment_membership() {
        let cfg = GeomCfg::default();
        let l = Line2::new(vector![4.0, 4.0], vector![0.0, 4.0]).unwrap();
        assert!(l.point_in_segment(vector![4.0, 4.0], &cfg));
        assert!(l.point_in_segment(vector![0.0, 4.0], &cfg));
        assert!(l.point_in_segment(vector![2.5, 4.0], &cfg));
        assert!(!l.point_in_segment(vector![-0.5, 4.0], &cfg));
        assert!(!l.point_in_segment(vector![2.0, 4.1], &cfg));
        // below the line too; a one-sided collinearity check would accept this
        assert!(!l.point_in_segment(vector![2.0, 3.9], &cfg));
        assert!(l.point_in_segment(vector![2.0, 4.0 + 1e-9], &cfg));
    }

    #[test]
    fn signed_side_orientation() {
        let l = Line2::new(vector![0.0, 0.0], vector![1.0, 0.0]).unwrap();
        assert!(l.signed_side(vector![0.5, 1.0]) > 0.0);
        assert!(l.signed_side(vector![0.5, -1.0]) < 0.0);
        assert_eq!(l.signed_side(vector![3.0, 0.0]), 0.0);
    }
}
