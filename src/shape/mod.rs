//! The boundary container.
//!
//! A [`Shape`] holds the boundary loops as cubic beziers, oriented so the
//! interior lies to the right of each loop, together with the corner
//! classification computed when it was built.

mod closest;
pub mod orient;

use std::collections::BTreeMap;

use kurbo::{
    BezPath, Circle, CubicBez, ParamCurve, ParamCurveCurvature, ParamCurveExtrema, PathEl,
    Point, QuadBez, Rect, Vec2,
};
use log::debug;

use crate::config::MatConfig;
use crate::corners::{classify_loops, Corner, CornerKey};
use crate::error::MatError;
use crate::geom::{is_degenerate, line_to_cubic, unit_tangent};
use crate::point::{CurveId, PointKind, PointOnShape};

/// One closed boundary loop.
#[derive(Debug, Clone)]
pub struct Loop {
    curves: Vec<CubicBez>,
    bboxes: Vec<Rect>,
}

impl Loop {
    fn new(curves: Vec<CubicBez>) -> Self {
        let bboxes = curves.iter().map(ParamCurveExtrema::bounding_box).collect();
        Self { curves, bboxes }
    }

    pub fn curves(&self) -> &[CubicBez] {
        &self.curves
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

/// A parameter range of one boundary curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryPiece {
    pub curve: CurveId,
    pub t0: f64,
    pub t1: f64,
}

impl BoundaryPiece {
    pub fn whole(curve: CurveId) -> Self {
        Self {
            curve,
            t0: 0.0,
            t1: 1.0,
        }
    }
}

/// A shape bounded by closed loops of cubic beziers.
#[derive(Debug, Clone)]
pub struct Shape {
    loops: Vec<Loop>,
    corners: BTreeMap<CornerKey, Corner>,
    seeds: Vec<PointOnShape>,
    bbox: Rect,
    max_radius: f64,
    nearest_accuracy: f64,
}

impl Shape {
    /// Build a shape from bezier paths. Every subpath is one loop.
    ///
    /// Lines and quadratics are raised to cubics, zero-length segments are
    /// dropped and open subpaths are closed with a line.
    pub fn from_paths(paths: &[BezPath], config: &MatConfig) -> Result<Self, MatError> {
        let mut raw = Vec::new();
        for path in paths {
            raw.extend(split_loops(path)?);
        }
        if raw.is_empty() {
            return Err(MatError::NoLoops);
        }
        Ok(Self::from_loops(raw, config))
    }

    /// Build a shape from loops of cubics. Empty loops are ignored.
    pub fn from_loops(loops: Vec<Vec<CubicBez>>, config: &MatConfig) -> Self {
        let loops: Vec<Vec<CubicBez>> = loops.into_iter().filter(|l| !l.is_empty()).collect();
        let loops = orient::orient_loops(loops);
        let classification = classify_loops(&loops, config.cross_tangent_limit);

        let bbox = loops
            .iter()
            .flatten()
            .map(ParamCurveExtrema::bounding_box)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        let diagonal = (bbox.width().powi(2) + bbox.height().powi(2)).sqrt();
        let max_radius = config.max_osculating_radius.unwrap_or(diagonal);

        let mut shape = Self {
            loops: loops.into_iter().map(Loop::new).collect(),
            corners: classification.corners,
            seeds: Vec::new(),
            bbox,
            max_radius,
            nearest_accuracy: config.nearest_accuracy,
        };

        let mut seeds: Vec<PointOnShape> = classification
            .seeds
            .iter()
            .map(|s| shape.point_at(s.curve, s.t, s.kind, s.order))
            .collect();
        let n = config.seeds_per_curve;
        for (k, l) in shape.loops.iter().enumerate() {
            for i in 0..l.len() {
                for j in 1..=n {
                    let t = j as f64 / (n + 1) as f64;
                    seeds.push(shape.point_at(CurveId::new(k, i), t, PointKind::Standard, 0.0));
                }
            }
        }
        seeds.sort_by(|a, b| {
            a.curve
                .loop_idx
                .cmp(&b.curve.loop_idx)
                .then_with(|| a.cmp_position(b))
                .then_with(|| crate::point::cmp_f64(a.order, b.order))
        });
        debug!(
            "shape: {} loops, {} corners, {} seeds",
            shape.loops.len(),
            shape.corners.len(),
            seeds.len()
        );
        shape.seeds = seeds;
        shape
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn curve(&self, id: CurveId) -> CubicBez {
        self.loops[id.loop_idx].curves[id.curve_idx]
    }

    pub(crate) fn curve_bbox(&self, id: CurveId) -> Rect {
        self.loops[id.loop_idx].bboxes[id.curve_idx]
    }

    pub fn bounding_box(&self) -> Rect {
        self.bbox
    }

    /// Radius used for osculating circles of straight or outward-bending
    /// boundary.
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Concave junctions found while building the shape.
    pub fn corners(&self) -> &BTreeMap<CornerKey, Corner> {
        &self.corners
    }

    /// Seed points in loop order: junction points from the classifier plus
    /// evenly spaced interior points.
    pub fn seeds(&self) -> &[PointOnShape] {
        &self.seeds
    }

    /// Realise the point at `t` on the given curve.
    pub fn point_at(&self, curve: CurveId, t: f64, kind: PointKind, order: f64) -> PointOnShape {
        let c = self.curve(curve);
        let p = c.eval(t.clamp(0.0, 1.0));
        PointOnShape::new(curve, t, kind, order, p, self.loops[curve.loop_idx].len())
    }

    /// The concave corner a point sits on, if any.
    pub fn corner_at(&self, pos: &PointOnShape) -> Option<&Corner> {
        let junction = pos.junction()?;
        self.corners.get(&CornerKey {
            loop_idx: pos.curve.loop_idx,
            junction,
        })
    }

    /// Unit normal pointing into the shape interior.
    pub fn inward_normal(&self, pos: &PointOnShape) -> Vec2 {
        let t = unit_tangent(&self.curve(pos.curve), pos.t);
        Vec2::new(t.y, -t.x)
    }

    /// Circle of curvature on the interior side of the boundary.
    ///
    /// Sharp points get a zero-radius circle on the point itself. Straight
    /// boundary, or boundary bending away from the interior, gets the
    /// maximum radius.
    ///
    /// kurbo's curvature is positive where a loop turns clockwise, which on
    /// these loops is where the boundary is convex.
    pub fn osculating_circle(&self, pos: &PointOnShape) -> Circle {
        if pos.kind == PointKind::Sharp {
            return Circle::new(pos.p, 0.0);
        }
        let kappa = self.curve(pos.curve).curvature(pos.t);
        let radius = if kappa.is_finite() && kappa * self.max_radius > 1.0 {
            1.0 / kappa
        } else {
            self.max_radius
        };
        Circle::new(pos.p + self.inward_normal(pos) * radius, radius)
    }

    /// The whole of loop `k`, one piece per curve.
    pub fn loop_pieces(&self, k: usize) -> Vec<BoundaryPiece> {
        (0..self.loops[k].len())
            .map(|i| BoundaryPiece::whole(CurveId::new(k, i)))
            .collect()
    }

    /// Boundary from `a` forward to `b` along their common loop.
    ///
    /// When `whole_loop` is set and both points coincide, the full loop is
    /// returned starting at `a`; otherwise coincident points give a single
    /// zero-length piece.
    pub fn pieces_between(
        &self,
        a: &PointOnShape,
        b: &PointOnShape,
        whole_loop: bool,
    ) -> Vec<BoundaryPiece> {
        let k = a.curve.loop_idx;
        let n = self.loops[k].len();
        let (ca, ta) = a.loop_position();
        let (cb, tb) = b.loop_position();

        if !whole_loop && a.coincides_with(b) {
            return vec![BoundaryPiece {
                curve: CurveId::new(k, ca),
                t0: ta,
                t1: ta,
            }];
        }
        if !whole_loop && ca == cb && ta < tb {
            return vec![BoundaryPiece {
                curve: CurveId::new(k, ca),
                t0: ta,
                t1: tb,
            }];
        }

        let mut pieces = vec![BoundaryPiece {
            curve: CurveId::new(k, ca),
            t0: ta,
            t1: 1.0,
        }];
        let mut i = (ca + 1) % n;
        while i != cb {
            pieces.push(BoundaryPiece::whole(CurveId::new(k, i)));
            i = (i + 1) % n;
        }
        if tb > 0.0 {
            pieces.push(BoundaryPiece {
                curve: CurveId::new(k, cb),
                t0: 0.0,
                t1: tb,
            });
        }
        pieces
    }

    /// The highest point of loop `k` (largest y), preferring curve
    /// interiors over junctions on ties.
    pub fn extreme_point(&self, k: usize) -> PointOnShape {
        let mut best = (CurveId::new(k, 0), 0.0, f64::NEG_INFINITY);
        for (i, c) in self.loops[k].curves.iter().enumerate() {
            let mut ts = vec![0.5];
            ts.extend(c.extrema());
            ts.extend([0.0, 1.0]);
            for t in ts {
                let y = c.eval(t).y;
                let best_is_end = best.1 == 0.0 || best.1 == 1.0;
                let is_end = t == 0.0 || t == 1.0;
                if y > best.2 + 1e-9 || (y > best.2 - 1e-9 && best_is_end && !is_end) {
                    best = (CurveId::new(k, i), t, y);
                }
            }
        }
        self.point_at(best.0, best.1, PointKind::Standard, 0.0)
    }
}

/// Gap below which a subpath counts as already closed.
const CLOSE_EPSILON: f64 = 1e-9;

/// Split a path into loops of cubics.
fn split_loops(path: &BezPath) -> Result<Vec<Vec<CubicBez>>, MatError> {
    let mut loops = Vec::new();
    let mut current: Vec<CubicBez> = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;

    for el in path.elements() {
        let finite = match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => p.is_finite(),
            PathEl::QuadTo(a, p) => a.is_finite() && p.is_finite(),
            PathEl::CurveTo(a, b, p) => a.is_finite() && b.is_finite() && p.is_finite(),
            PathEl::ClosePath => true,
        };
        if !finite {
            return Err(MatError::InvalidPath(format!("non-finite coordinate in {el:?}")));
        }

        match *el {
            PathEl::MoveTo(p) => {
                finish_loop(&mut loops, &mut current, last, start);
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                push_curve(&mut current, line_to_cubic(last, p));
                last = p;
            }
            PathEl::QuadTo(a, p) => {
                push_curve(&mut current, QuadBez::new(last, a, p).raise());
                last = p;
            }
            PathEl::CurveTo(a, b, p) => {
                push_curve(&mut current, CubicBez::new(last, a, b, p));
                last = p;
            }
            PathEl::ClosePath => {
                finish_loop(&mut loops, &mut current, last, start);
                last = start;
            }
        }
    }
    finish_loop(&mut loops, &mut current, last, start);
    Ok(loops)
}

fn push_curve(current: &mut Vec<CubicBez>, c: CubicBez) {
    if !is_degenerate(&c) {
        current.push(c);
    }
}

/// Close the loop being built with a line if needed and move it to `loops`.
fn finish_loop(loops: &mut Vec<Vec<CubicBez>>, current: &mut Vec<CubicBez>, last: Point, start: Point) {
    if current.is_empty() {
        return;
    }
    if (last - start).length() > CLOSE_EPSILON {
        push_curve(current, line_to_cubic(last, start));
    } else if let Some(c) = current.last_mut() {
        // Snap the end so the loop is exactly closed.
        c.p3 = start;
    }
    loops.push(std::mem::take(current));
}
