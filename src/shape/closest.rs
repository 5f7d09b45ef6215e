use kurbo::{ParamCurve, ParamCurveDeriv, ParamCurveNearest, Point};

use super::{BoundaryPiece, Shape};
use crate::geom::{dist_sq, sq_dist_to_rect};
use crate::point::{CurveId, PointKind, PointOnShape};

/// Half-width of the parameter window left out around an excluded point.
const EXCLUDE_WINDOW: f64 = 1e-6;

/// Squared distance at which a candidate counts as the excluded point itself.
const COINCIDENT_SQ: f64 = 1e-20;

/// Newton steps spent refining a nearest-point estimate on the full curve.
const POLISH_STEPS: usize = 4;

impl Shape {
    /// Closest boundary point to `p` over the given pieces.
    ///
    /// With `exclude` set, the curve holding that point (and the curve
    /// sharing its junction, if it sits on one) is searched on either side
    /// of it only. Minima that land on the edge of the left-out window, or
    /// on the excluded point itself, are discarded. Returns None when every
    /// piece was skipped.
    pub fn closest_boundary_point(
        &self,
        pieces: &[BoundaryPiece],
        p: Point,
        exclude: Option<&PointOnShape>,
    ) -> Option<PointOnShape> {
        let holes = exclude.map(|y| self.excluded_params(y)).unwrap_or_default();

        let mut best: Option<(CurveId, f64, f64)> = None;
        for piece in pieces {
            let best_d = best.map_or(f64::INFINITY, |b| b.2);
            if sq_dist_to_rect(self.curve_bbox(piece.curve), p) > best_d {
                continue;
            }

            let hole = holes
                .iter()
                .find(|(c, _)| *c == piece.curve)
                .map(|&(_, t)| t);
            for (t0, t1, inner) in split_range(piece.t0, piece.t1, hole) {
                let Some((t, d)) = self.nearest_in_range(piece.curve, t0, t1, p) else {
                    continue;
                };
                if inner.iter().any(|&edge| (t - edge).abs() <= EXCLUDE_WINDOW) {
                    continue;
                }
                if let Some(y) = exclude {
                    if dist_sq(self.curve(piece.curve).eval(t), y.p) <= COINCIDENT_SQ {
                        continue;
                    }
                }
                if d < best.map_or(f64::INFINITY, |b| b.2) {
                    best = Some((piece.curve, t, d));
                }
            }
        }

        best.map(|(curve, t, _)| self.point_at(curve, t, PointKind::Standard, 0.0))
    }

    /// Nearest parameter and squared distance on `curve` restricted to
    /// `[t0, t1]`.
    ///
    /// Candidates from the subsegment search, the whole-curve search and the
    /// range ends are all measured on the original curve, then the winner is
    /// refined with Newton steps. The subsegment search alone misses the foot
    /// on straight cubics cut at uneven parameters.
    fn nearest_in_range(&self, curve: CurveId, t0: f64, t1: f64, p: Point) -> Option<(f64, f64)> {
        if t1 < t0 {
            return None;
        }
        let c = self.curve(curve);
        if t1 - t0 <= f64::EPSILON {
            return Some((t0, dist_sq(c.eval(t0), p)));
        }

        let sub = c.subsegment(t0..t1).nearest(p, self.nearest_accuracy);
        let whole = c.nearest(p, self.nearest_accuracy);
        let mut candidates = vec![t0 + sub.t * (t1 - t0)];
        if (t0..=t1).contains(&whole.t) {
            candidates.push(whole.t);
        }
        // Range ends last, so they only win when strictly closer.
        candidates.extend([t0, t1]);

        let mut best = (t0, f64::INFINITY);
        for t in candidates {
            let d = dist_sq(c.eval(t), p);
            if d < best.1 {
                best = (t, d);
            }
        }

        let d1 = c.deriv();
        let d2 = d1.deriv();
        for _ in 0..POLISH_STEPS {
            let (t, d) = best;
            let v = c.eval(t) - p;
            let tangent = d1.eval(t).to_vec2();
            let g = v.dot(tangent);
            let h = tangent.dot(tangent) + v.dot(d2.eval(t).to_vec2());
            if h <= 0.0 {
                break;
            }
            let next = (t - g / h).clamp(t0, t1);
            let nd = dist_sq(c.eval(next), p);
            if nd >= d {
                break;
            }
            best = (next, nd);
        }
        Some(best)
    }

    /// Parameters to leave out around `y`, per curve.
    fn excluded_params(&self, y: &PointOnShape) -> Vec<(CurveId, f64)> {
        let mut out = vec![(y.curve, y.t)];
        if let Some(j) = y.junction() {
            let k = y.curve.loop_idx;
            let n = self.loops[k].len();
            let incoming = CurveId::new(k, j);
            let outgoing = CurveId::new(k, (j + 1) % n);
            if y.curve == incoming && incoming != outgoing {
                out.push((outgoing, 0.0));
            } else if y.curve == outgoing && incoming != outgoing {
                out.push((incoming, 1.0));
            } else if incoming == outgoing {
                // Single-curve loop: both ends are the same point.
                out.push((incoming, if y.t < 0.5 { 1.0 } else { 0.0 }));
            }
        }
        out
    }
}

/// Split `[t0, t1]` around `hole`, returning each remaining sub-range with
/// the ends that border the hole.
fn split_range(t0: f64, t1: f64, hole: Option<f64>) -> Vec<(f64, f64, Vec<f64>)> {
    let Some(h) = hole else {
        return vec![(t0, t1, vec![])];
    };
    if h < t0 - EXCLUDE_WINDOW || h > t1 + EXCLUDE_WINDOW {
        return vec![(t0, t1, vec![])];
    }
    let mut out = Vec::new();
    let below = h - EXCLUDE_WINDOW;
    if below > t0 {
        out.push((t0, below, vec![below]));
    }
    let above = h + EXCLUDE_WINDOW;
    if above < t1 {
        out.push((above, t1, vec![above]));
    }
    out
}
