//! Convex polygons as ordered vertex rings, and slicing along a line.
//!
//! Invariants
//! - At least three vertices; consecutive vertices (cyclically) form the edges.
//! - The ring describes a simple convex region. Winding is not fixed: slicing
//!   produces either orientation and nothing downstream depends on the sign.
//! - Polygons are values. `slice` returns new polygons and never edits `self`.
//!
//! Code cross-refs: `line::Line2`, `types::{GeomCfg, GeomError}`

use std::fmt;

use nalgebra::Vector2;
use tracing::trace;

use super::line::Line2;
use super::types::{GeomCfg, GeomError};
use super::vector::Vec2Ext;

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vector2<f64>>,
}

/// A point where a cast line crosses edge `edge` (the edge `V[edge] → V[edge+1]`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub point: Vector2<f64>,
    pub edge: usize,
}

/// Result of `Polygon::slice`.
#[derive(Clone, Debug, PartialEq)]
pub enum Slice {
    /// The line did not cut through the interior; the polygon comes back unchanged.
    Whole(Polygon),
    /// Two halves on either side of the cut. The first is the arc running
    /// forward from the lower-indexed crossing edge to the higher one.
    Split(Polygon, Polygon),
}

impl Slice {
    /// Number of pieces (1 or 2).
    #[inline]
    pub fn pieces(&self) -> usize {
        match self {
            Slice::Whole(_) => 1,
            Slice::Split(..) => 2,
        }
    }
}

impl Polygon {
    pub fn new(vertices: Vec<Vector2<f64>>) -> Result<Self, GeomError> {
        if vertices.len() < 3 {
            return Err(GeomError::TooFewVertices {
                count: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// Axis-aligned rectangle `[0, width] × [0, height]`.
    pub fn rect(width: f64, height: f64) -> Self {
        Self {
            vertices: vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(width, 0.0),
                Vector2::new(width, height),
                Vector2::new(0.0, height),
            ],
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false for a constructed polygon; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edge `i` as the pair `(V[i], V[i+1 mod n])`.
    #[inline]
    pub fn edge(&self, i: usize) -> (Vector2<f64>, Vector2<f64>) {
        let n = self.vertices.len();
        (self.vertices[i], self.vertices[(i + 1) % n])
    }

    /// Crossings of the line `a→b` with the polygon's edges.
    ///
    /// Each vertex is classified once by its distance to the cast line; within
    /// `eps_collinear` it counts as on the line. Per edge: skip when parallel to
    /// the cast line; skip when the second endpoint is on the line (the next
    /// edge reports that vertex as its first endpoint, so a vertex hit is
    /// counted once); report the first endpoint when it is on the line;
    /// otherwise report the intersection when the endpoints lie on opposite
    /// sides.
    ///
    /// For a convex polygon the result has 2 entries when the line crosses the
    /// interior, 1 when it only touches a vertex or runs along an edge, 0 when
    /// it misses. Errors only for `a == b`.
    pub fn intersects_from_line(
        &self,
        a: Vector2<f64>,
        b: Vector2<f64>,
        cfg: &GeomCfg,
    ) -> Result<Vec<Crossing>, GeomError> {
        let cast = Line2::new(a, b)?;
        let len = cast.vec.norm();
        let sides: Vec<f64> = self
            .vertices
            .iter()
            .map(|&p| {
                let d = cast.signed_side(p) / len;
                if d.abs() <= cfg.eps_collinear {
                    0.0
                } else {
                    d
                }
            })
            .collect();
        let n = self.vertices.len();
        let mut out = Vec::with_capacity(2);
        for i in 0..n {
            let (vi, vj) = self.edge(i);
            let side = match Line2::new(vi, vj) {
                Ok(side) => side,
                // repeated vertex: a zero-length edge cannot be crossed
                Err(_) => continue,
            };
            if side.parallel_eps(&cast, cfg) {
                trace!(edge = i, "parallel to cast line; skipping");
                continue;
            }
            let (si, sj) = (sides[i], sides[(i + 1) % n]);
            if sj == 0.0 {
                trace!(edge = i, "hit on second endpoint; skipping");
                continue;
            }
            if si == 0.0 {
                trace!(edge = i, x = vi.x, y = vi.y, "vertex on cast line");
                out.push(Crossing { point: vi, edge: i });
                continue;
            }
            if (si < 0.0) == (sj < 0.0) {
                continue;
            }
            let Some(hit) = side.intersection(&cast) else {
                continue;
            };
            trace!(edge = i, x = hit.x, y = hit.y, "accepted");
            out.push(Crossing { point: hit, edge: i });
        }
        trace!(count = out.len(), line = %cast, "crossings");
        Ok(out)
    }

    /// Split along the line `a→b`.
    ///
    /// - Fewer than two crossings: `Slice::Whole(self.clone())`.
    /// - Two crossings `pA` on edge `i` and `pB` on edge `j` (`i < j`):
    ///   the first half is `V[i+1..=j], pB, pA`; the second is
    ///   `V[..=i], pA, pB, V[j+1..]`.
    /// - More than two: `GeomError::TooManyCrossings` (the region is not convex).
    ///
    /// A half that collapses to fewer than three distinct vertices or to zero
    /// area means the cut ran along the boundary; that is reported as `Whole`.
    pub fn slice(
        &self,
        a: Vector2<f64>,
        b: Vector2<f64>,
        cfg: &GeomCfg,
    ) -> Result<Slice, GeomError> {
        let mut crossings = self.intersects_from_line(a, b, cfg)?;
        match crossings.len() {
            0 | 1 => return Ok(Slice::Whole(self.clone())),
            2 => {}
            count => return Err(GeomError::TooManyCrossings { count }),
        }
        crossings.sort_by_key(|c| c.edge);
        let (ca, cb) = (crossings[0], crossings[1]);
        let v = &self.vertices;

        let mut first: Vec<Vector2<f64>> = Vec::with_capacity(cb.edge - ca.edge + 2);
        for &p in &v[ca.edge + 1..=cb.edge] {
            push_distinct(&mut first, p, cfg);
        }
        push_distinct(&mut first, cb.point, cfg);
        push_distinct(&mut first, ca.point, cfg);
        close_ring(&mut first, cfg);

        let mut second: Vec<Vector2<f64>> = Vec::with_capacity(v.len() + 2);
        for &p in &v[..=ca.edge] {
            push_distinct(&mut second, p, cfg);
        }
        push_distinct(&mut second, ca.point, cfg);
        push_distinct(&mut second, cb.point, cfg);
        for &p in &v[cb.edge + 1..] {
            push_distinct(&mut second, p, cfg);
        }
        close_ring(&mut second, cfg);

        let eps_area = cfg.eps_point;
        if first.len() < 3
            || second.len() < 3
            || shoelace(&first).abs() <= eps_area
            || shoelace(&second).abs() <= eps_area
        {
            trace!("cut runs along the boundary; no split");
            return Ok(Slice::Whole(self.clone()));
        }
        Ok(Slice::Split(
            Polygon { vertices: first },
            Polygon { vertices: second },
        ))
    }

    /// Arithmetic mean of the vertices. A cheap stand-in for the centroid that
    /// drifts toward densely-vertexed corners on long slivers.
    pub fn average_vertex(&self) -> Vector2<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::zeros(), |acc: Vector2<f64>, p| acc + p);
        sum / self.vertices.len() as f64
    }

    /// Smallest axis-aligned rectangle containing the polygon.
    pub fn bounding_rect(&self) -> Polygon {
        let (mut left, mut top) = (f64::INFINITY, f64::INFINITY);
        let (mut right, mut bottom) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.vertices {
            left = left.min(p.x);
            right = right.max(p.x);
            top = top.min(p.y);
            bottom = bottom.max(p.y);
        }
        Polygon {
            vertices: vec![
                Vector2::new(left, top),
                Vector2::new(right, top),
                Vector2::new(right, bottom),
                Vector2::new(left, bottom),
            ],
        }
    }

    /// Shoelace area; positive for counter-clockwise rings (in y-up axes).
    #[inline]
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.vertices)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn perimeter(&self) -> f64 {
        (0..self.vertices.len())
            .map(|i| {
                let (p, q) = self.edge(i);
                p.distance_to(&q)
            })
            .sum()
    }

    /// Horizontal extent `(x_min, x_max)` of the polygon on the line at height
    /// `y`, or `None` if the line misses it by more than `eps`.
    pub fn x_span_at(&self, y: f64, eps: f64) -> Option<(f64, f64)> {
        let mut span: Option<(f64, f64)> = None;
        let mut take = |x: f64| {
            span = Some(match span {
                Some((lo, hi)) => (lo.min(x), hi.max(x)),
                None => (x, x),
            });
        };
        for i in 0..self.vertices.len() {
            let (p, q) = self.edge(i);
            if y < p.y.min(q.y) - eps || y > p.y.max(q.y) + eps {
                continue;
            }
            if (q.y - p.y).abs() <= eps {
                take(p.x);
                take(q.x);
            } else {
                let t = ((y - p.y) / (q.y - p.y)).clamp(0.0, 1.0);
                take(p.x + t * (q.x - p.x));
            }
        }
        span
    }

    /// Membership for convex polygons of either winding, with `eps` slack
    /// measured as distance outside an edge.
    pub fn contains(&self, p: Vector2<f64>, eps: f64) -> bool {
        let orient = self.signed_area().signum();
        (0..self.vertices.len()).all(|i| {
            let (vi, vj) = self.edge(i);
            let e = vj - vi;
            let len = e.norm();
            if len == 0.0 {
                return true;
            }
            orient * e.cross_z(&(p - vi)) / len >= -eps
        })
    }

    /// Every turn between consecutive edges has the same sign (near-zero turns,
    /// i.e. collinear vertices, are ignored).
    pub fn is_convex(&self, eps: f64) -> bool {
        let n = self.vertices.len();
        let mut sign = 0.0;
        for i in 0..n {
            let (p, q) = self.edge(i);
            let r = self.vertices[(i + 2) % n];
            let turn = (q - p).cross_z(&(r - q));
            if turn.abs() <= eps {
                continue;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poly[")?;
        for (i, p) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.2} {:.2}", p.x, p.y)?;
        }
        write!(f, "]")
    }
}

fn shoelace(verts: &[Vector2<f64>]) -> f64 {
    let n = verts.len();
    let mut acc = 0.0;
    for i in 0..n {
        acc += verts[i].cross_z(&verts[(i + 1) % n]);
    }
    0.5 * acc
}

#[inline]
fn push_distinct(out: &mut Vec<Vector2<f64>>, p: Vector2<f64>, cfg: &GeomCfg) {
    if out.last().is_some_and(|last| cfg.coincide(*last, p)) {
        return;
    }
    out.push(p);
}

#[inline]
fn close_ring(out: &mut Vec<Vector2<f64>>, cfg: &GeomCfg) {
    while out.len() > 1 && cfg.coincide(out[0], out[out.len() - 1]) {
        out.pop();
    }
}
