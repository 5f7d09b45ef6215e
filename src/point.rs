//! Points on the shape boundary.

use std::cmp::Ordering;

use kurbo::Point;

/// Parameters this close to 0 or 1 are treated as sitting on a junction.
const JUNCTION_EPSILON: f64 = 1e-12;

/// Handle of one curve of one boundary loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurveId {
    pub loop_idx: usize,
    pub curve_idx: usize,
}

impl CurveId {
    pub fn new(loop_idx: usize, curve_idx: usize) -> Self {
        Self {
            loop_idx,
            curve_idx,
        }
    }
}

/// Classification of a boundary point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// Interior of a curve, or a junction that is effectively smooth.
    Standard,
    /// A convex junction with a strong tangent discontinuity.
    Sharp,
    /// A concave (reflex) junction.
    Dull,
}

/// A point lying on a boundary curve.
///
/// `p` is always the curve evaluated at `t`. Two points at the same spot
/// on a junction (end of one curve, start of the next) share the same
/// loop position, so they order and compare as one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOnShape {
    pub curve: CurveId,
    pub t: f64,
    pub kind: PointKind,
    /// Tie-break among coincident points.
    pub order: f64,
    pub p: Point,
    position: (usize, f64),
    junction: Option<usize>,
}

impl PointOnShape {
    /// Build a point on `curve` of a loop with `curve_count` curves.
    ///
    /// Use [`Shape::point_at`](crate::Shape::point_at) rather than calling
    /// this directly; it evaluates `p` for you.
    pub(crate) fn new(
        curve: CurveId,
        t: f64,
        kind: PointKind,
        order: f64,
        p: Point,
        curve_count: usize,
    ) -> Self {
        let t = t.clamp(0.0, 1.0) + 0.0;
        let n = curve_count.max(1);
        let i = curve.curve_idx;
        let (position, junction) = if t >= 1.0 - JUNCTION_EPSILON {
            (((i + 1) % n, 0.0), Some(i))
        } else if t <= JUNCTION_EPSILON {
            ((i, 0.0), Some((i + n - 1) % n))
        } else {
            ((i, t), None)
        };
        Self {
            curve,
            t,
            kind,
            order,
            p,
            position,
            junction,
        }
    }

    /// Position along the loop as (curve index, parameter), with `t == 1`
    /// folded onto the start of the following curve.
    pub fn loop_position(&self) -> (usize, f64) {
        self.position
    }

    /// The junction this point sits on, if any. Junction `j` joins curve
    /// `j` to curve `j + 1`.
    pub fn junction(&self) -> Option<usize> {
        self.junction
    }

    /// Order along the loop, ignoring ties among coincident points.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.position
            .0
            .cmp(&other.position.0)
            .then_with(|| cmp_f64(self.position.1, other.position.1))
    }

    /// Whether both points sit at the same loop position.
    pub fn coincides_with(&self, other: &Self) -> bool {
        self.curve.loop_idx == other.curve.loop_idx
            && self.cmp_position(other) == Ordering::Equal
    }
}

pub(crate) fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
